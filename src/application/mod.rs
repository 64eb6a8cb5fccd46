pub mod cart;
pub mod catalog;
pub mod favourites;
pub mod fulfilment;
pub mod optimistic;
pub mod pricing;
pub mod requests;
