use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde_json::{json, Value};

use crate::domain::errors::DomainError;
use crate::domain::fulfilment::{Shipment, ShipmentStatus, Transaction};
use crate::domain::ports::{collections, DocumentStore};
use crate::domain::session::Session;

use super::pricing;

#[derive(Debug, Clone)]
pub struct NewShipment {
    pub order_id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub product_id: Option<String>,
    pub expected_delivery: String,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub order_id: String,
    pub amount: BigDecimal,
    pub status: String,
    pub payment_method: String,
}

/// Shipment tracking and the append-only transaction log.
pub struct FulfilmentService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
}

impl<S: DocumentStore + ?Sized> FulfilmentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ── shipments ────────────────────────────────────────────────────────────

    pub fn add_shipment(
        &self,
        session: &Session,
        input: NewShipment,
    ) -> Result<String, DomainError> {
        session.require_admin()?;
        if input.order_id.trim().is_empty() || input.user_id.trim().is_empty() {
            return Err(DomainError::Validation(
                "order id and user id must not be empty".to_string(),
            ));
        }
        let mut doc = json!({
            "orderId": input.order_id,
            "userId": input.user_id,
            "status": ShipmentStatus::Pending,
            "expectedDelivery": input.expected_delivery,
        });
        if let Some(name) = input.user_name {
            doc["userName"] = json!(name);
        }
        if let Some(product_id) = input.product_id {
            doc["productId"] = json!(product_id);
        }
        Ok(self.store.create(collections::SHIPMENTS, doc)?)
    }

    pub fn list_all_shipments(&self, session: &Session) -> Result<Vec<Shipment>, DomainError> {
        session.require_admin()?;
        parse_shipments(self.store.get_all(collections::SHIPMENTS)?)
    }

    pub fn shipments_for_user(&self, session: &Session) -> Result<Vec<Shipment>, DomainError> {
        let docs =
            self.store
                .query_eq(collections::SHIPMENTS, "userId", &json!(session.user_id))?;
        parse_shipments(docs)
    }

    /// Move a shipment along. Delivered and cancelled shipments are frozen;
    /// any transition out of them is rejected.
    pub fn update_shipment_status(
        &self,
        session: &Session,
        shipment_id: &str,
        status: ShipmentStatus,
    ) -> Result<(), DomainError> {
        session.require_admin()?;
        let doc = self
            .store
            .get(collections::SHIPMENTS, shipment_id)?
            .ok_or_else(|| {
                DomainError::NotFound(format!("{}/{}", collections::SHIPMENTS, shipment_id))
            })?;
        let shipment: Shipment = serde_json::from_value(doc)
            .map_err(|e| DomainError::Internal(format!("malformed shipment: {}", e)))?;
        if shipment.status.is_terminal() {
            return Err(DomainError::Validation(format!(
                "shipment is already {}",
                shipment.status
            )));
        }
        self.store.update(
            collections::SHIPMENTS,
            shipment_id,
            json!({ "status": status }),
        )?;
        Ok(())
    }

    // ── transactions ─────────────────────────────────────────────────────────

    /// Record a payment for the session user. The log is append-only; there
    /// is deliberately no update or delete counterpart.
    pub fn record_transaction(
        &self,
        session: &Session,
        input: NewTransaction,
    ) -> Result<String, DomainError> {
        if !pricing::is_valid_price(&input.amount) {
            return Err(DomainError::Validation(
                "amount must be positive".to_string(),
            ));
        }
        Ok(self.store.create(
            collections::TRANSACTIONS,
            json!({
                "userId": session.user_id,
                "orderId": input.order_id,
                "amount": input.amount,
                "date": Utc::now(),
                "status": input.status,
                "paymentMethod": input.payment_method,
            }),
        )?)
    }

    pub fn transactions_for_user(&self, session: &Session) -> Result<Vec<Transaction>, DomainError> {
        let docs =
            self.store
                .query_eq(collections::TRANSACTIONS, "userId", &json!(session.user_id))?;
        let mut transactions: Vec<Transaction> = docs
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc)
                    .map_err(|e| DomainError::Internal(format!("malformed transaction: {}", e)))
            })
            .collect::<Result<_, _>>()?;
        // Newest first, matching how a history screen reads.
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }
}

fn parse_shipments(docs: Vec<Value>) -> Result<Vec<Shipment>, DomainError> {
    docs.into_iter()
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| DomainError::Internal(format!("malformed shipment: {}", e)))
        })
        .collect()
}
