use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde_json::{json, Value};

use crate::domain::catalog::Product;
use crate::domain::errors::DomainError;
use crate::domain::ports::{collections, DocumentStore};
use crate::domain::session::Session;

use super::pricing;

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    pub description: String,
    pub picture_url: Option<String>,
    pub seller: Option<String>,
}

/// Catalog maintenance. Reads are open; writes require the admin role.
pub struct CatalogService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
}

impl<S: DocumentStore + ?Sized> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// New products always start deactivated; listing them is a separate,
    /// deliberate step.
    pub fn add_product(&self, session: &Session, input: NewProduct) -> Result<String, DomainError> {
        session.require_admin()?;
        if input.name.trim().is_empty() {
            return Err(DomainError::Validation("name must not be empty".to_string()));
        }
        if !pricing::is_valid_price(&input.price) {
            return Err(DomainError::Validation(
                "price must be positive".to_string(),
            ));
        }
        let mut doc = json!({
            "name": input.name,
            "category": input.category,
            "price": input.price,
            "description": input.description,
            "activate": false,
        });
        if let Some(url) = input.picture_url {
            doc["pictureUrl"] = json!(url);
        }
        if let Some(seller) = input.seller {
            doc["seller"] = json!(seller);
        }
        Ok(self.store.create(collections::ITEMS, doc)?)
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        parse_products(self.store.get_all(collections::ITEMS)?)
    }

    /// Only products toggled live, for the customer-facing listing.
    pub fn list_active_products(&self) -> Result<Vec<Product>, DomainError> {
        let docs = self
            .store
            .query_eq(collections::ITEMS, "activate", &json!(true))?;
        parse_products(docs)
    }

    pub fn get_product(&self, product_id: &str) -> Result<Option<Product>, DomainError> {
        match self.store.get(collections::ITEMS, product_id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc).map_err(|e| {
                DomainError::Internal(format!("malformed product: {}", e))
            })?)),
            None => Ok(None),
        }
    }

    /// Idempotent removal. Cart lines pointing at the deleted product are
    /// left in place and filtered out at read time.
    pub fn delete_product(&self, session: &Session, product_id: &str) -> Result<(), DomainError> {
        session.require_admin()?;
        Ok(self.store.delete(collections::ITEMS, product_id)?)
    }

    /// Explicit desired state rather than a toggle, so a stale admin view
    /// cannot flip a product the wrong way.
    pub fn set_activation(
        &self,
        session: &Session,
        product_id: &str,
        active: bool,
    ) -> Result<(), DomainError> {
        session.require_admin()?;
        self.store
            .update(collections::ITEMS, product_id, json!({ "activate": active }))?;
        Ok(())
    }

    pub fn update_price(
        &self,
        session: &Session,
        product_id: &str,
        price: BigDecimal,
    ) -> Result<(), DomainError> {
        session.require_admin()?;
        if !pricing::is_valid_price(&price) {
            return Err(DomainError::Validation(
                "price must be positive".to_string(),
            ));
        }
        self.store
            .update(collections::ITEMS, product_id, json!({ "price": price }))?;
        Ok(())
    }

    /// Look up the product created for an accepted custom request.
    pub fn product_by_custom_request(
        &self,
        request_id: &str,
    ) -> Result<Option<Product>, DomainError> {
        let docs =
            self.store
                .query_eq(collections::ITEMS, "customRequestId", &json!(request_id))?;
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(serde_json::from_value(doc).map_err(|e| {
                DomainError::Internal(format!("malformed product: {}", e))
            })?)),
            None => Ok(None),
        }
    }
}

fn parse_products(docs: Vec<Value>) -> Result<Vec<Product>, DomainError> {
    docs.into_iter()
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| DomainError::Internal(format!("malformed product: {}", e)))
        })
        .collect()
}
