use serde_json::Value;
use thiserror::Error;

use super::errors::DomainError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },
    #[error("'in' query on {0} requires at least one id")]
    EmptyInQuery(String),
    #[error("store read failed: {0}")]
    ReadFailed(String),
    #[error("store write failed: {0}")]
    WriteFailed(String),
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { collection, id } => {
                DomainError::NotFound(format!("{}/{}", collection, id))
            }
            StoreError::EmptyInQuery(_) => DomainError::Internal(e.to_string()),
            StoreError::ReadFailed(_) | StoreError::WriteFailed(_) => {
                DomainError::Remote(e.to_string())
            }
        }
    }
}

/// Port onto the remote document database. Collections are flat namespaces
/// of JSON documents keyed by opaque string ids; per-user cart and favourite
/// collections are addressed through the helpers in [`collections`].
///
/// Documents returned by any read operation carry their id under `"id"`,
/// so `query_in(.., "id", ..)` selects documents by key.
pub trait DocumentStore: Send + Sync {
    /// Create a document with a store-assigned id. Returns the new id.
    fn create(&self, collection: &str, doc: Value) -> Result<String, StoreError>;

    /// Create or replace the document with a caller-chosen id.
    fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    fn get_all(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Equality query on a single top-level field.
    fn query_eq(&self, collection: &str, field: &str, value: &Value)
        -> Result<Vec<Value>, StoreError>;

    /// Membership query on a single top-level field. An empty `values` slice
    /// is rejected with [`StoreError::EmptyInQuery`]; callers must
    /// short-circuit before issuing one.
    fn query_in(
        &self,
        collection: &str,
        field: &str,
        values: &[String],
    ) -> Result<Vec<Value>, StoreError>;

    /// Merge the top-level fields of `fields` into an existing document.
    /// Fails with [`StoreError::NotFound`] when the document is absent.
    fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document is not an error.
    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Atomically add `delta` to a numeric field of an existing document.
    fn increment_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), StoreError>;
}

/// Collection names as laid out in the remote store.
pub mod collections {
    pub const ITEMS: &str = "items";
    pub const CUSTOM_REQUESTS: &str = "customRequests";
    pub const CUSTOMER_INQUIRY: &str = "customerInquiry";
    pub const SHIPMENTS: &str = "shipments";
    pub const TRANSACTIONS: &str = "transactions";

    pub fn user_cart(user_id: &str) -> String {
        format!("users/{}/cart", user_id)
    }

    pub fn user_favourites(user_id: &str) -> String {
        format!("users/{}/favourites", user_id)
    }
}
