pub mod cart;
pub mod catalog;
pub mod errors;
pub mod fulfilment;
pub mod ports;
pub mod requests;
pub mod session;
