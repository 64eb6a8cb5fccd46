use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde_json::{json, Value};

use crate::domain::catalog::CUSTOM_REQUEST_CATEGORY;
use crate::domain::errors::DomainError;
use crate::domain::ports::{collections, DocumentStore};
use crate::domain::requests::{CustomRequest, CustomerInquiry, InquiryStatus, RequestStatus};
use crate::domain::session::Session;

use super::optimistic::with_rollback;
use super::pricing;

#[derive(Debug, Clone)]
pub struct NewRequest {
    pub description: String,
    pub quantity: u32,
    pub product_id: Option<String>,
}

/// How an accept resolved: either an existing product was linked, or a new
/// one was created at the derived per-unit price.
#[derive(Debug, Clone)]
pub enum AcceptOutcome {
    LinkedExisting { product_id: String },
    CreatedProduct {
        product_id: String,
        per_unit_price: BigDecimal,
    },
}

/// Workflow over custom requests and customer inquiries.
///
/// Requests move `pending → accepted | denied`, inquiries move
/// `pending → answered`; both are terminal after the first transition.
pub struct RequestService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
}

impl<S: DocumentStore + ?Sized> RequestService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ── custom requests ──────────────────────────────────────────────────────

    /// Create a pending request on behalf of the session user. Rejected
    /// before any store write when the description is blank or the quantity
    /// is zero.
    pub fn submit(&self, session: &Session, request: NewRequest) -> Result<String, DomainError> {
        if request.description.trim().is_empty() {
            return Err(DomainError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        if request.quantity == 0 {
            return Err(DomainError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }
        let mut doc = json!({
            "userId": session.user_id,
            "userName": session.display_name,
            "description": request.description,
            "quantity": request.quantity,
            "status": RequestStatus::Pending,
            "createdAt": Utc::now(),
        });
        if let Some(product_id) = request.product_id {
            doc["productId"] = json!(product_id);
        }
        Ok(self.store.create(collections::CUSTOM_REQUESTS, doc)?)
    }

    fn load_request(&self, request_id: &str) -> Result<CustomRequest, DomainError> {
        let doc = self
            .store
            .get(collections::CUSTOM_REQUESTS, request_id)?
            .ok_or_else(|| {
                DomainError::NotFound(format!("{}/{}", collections::CUSTOM_REQUESTS, request_id))
            })?;
        serde_json::from_value(doc)
            .map_err(|e| DomainError::Internal(format!("malformed custom request: {}", e)))
    }

    /// Direct accept/deny without touching the catalog. Used when the
    /// request already points at an existing product, and for denials.
    pub fn resolve(
        &self,
        session: &Session,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), DomainError> {
        session.require_admin()?;
        if status == RequestStatus::Pending {
            return Err(DomainError::Validation(
                "a request cannot be resolved back to pending".to_string(),
            ));
        }
        let request = self.load_request(request_id)?;
        if request.status.is_terminal() {
            return Err(DomainError::Validation(format!(
                "request is already {}",
                request.status
            )));
        }
        self.store.update(
            collections::CUSTOM_REQUESTS,
            request_id,
            json!({ "status": status }),
        )?;
        Ok(())
    }

    /// Accept a request that needs a catalog entry, deriving the per-unit
    /// price from the admin-entered total.
    ///
    /// There is no cross-collection transaction, so the two writes are
    /// ordered to be retryable: the product (carrying the request id as a
    /// back-reference) is created first, and the single request update then
    /// records both the accepted status and the product link. A failure in
    /// between leaves the request pending with an orphan product that the
    /// back-reference lookup reclaims on the next attempt.
    pub fn accept_with_price(
        &self,
        session: &Session,
        request_id: &str,
        total: BigDecimal,
    ) -> Result<AcceptOutcome, DomainError> {
        session.require_admin()?;
        let request = self.load_request(request_id)?;
        if request.status.is_terminal() {
            return Err(DomainError::Validation(format!(
                "request is already {}",
                request.status
            )));
        }

        // Already linked to a live product: accept without creating another.
        if let Some(product_id) = &request.product_id {
            if self.store.get(collections::ITEMS, product_id)?.is_some() {
                self.store.update(
                    collections::CUSTOM_REQUESTS,
                    request_id,
                    json!({ "status": RequestStatus::Accepted }),
                )?;
                return Ok(AcceptOutcome::LinkedExisting {
                    product_id: product_id.clone(),
                });
            }
        }

        // A product carrying this back-reference is a leftover from a
        // previous attempt that failed before the request update.
        let orphans =
            self.store
                .query_eq(collections::ITEMS, "customRequestId", &json!(request_id))?;
        if let Some(doc) = orphans.into_iter().next() {
            let product_id = doc
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| DomainError::Internal("product document without id".to_string()))?
                .to_string();
            self.store.update(
                collections::CUSTOM_REQUESTS,
                request_id,
                json!({ "status": RequestStatus::Accepted, "productId": product_id }),
            )?;
            return Ok(AcceptOutcome::LinkedExisting { product_id });
        }

        if !pricing::is_valid_price(&total) {
            return Err(DomainError::Validation(
                "total price must be positive".to_string(),
            ));
        }
        let per_unit_price = pricing::per_unit_price(&total, request.quantity);

        let product_id = self.store.create(
            collections::ITEMS,
            json!({
                "name": request.description,
                "description": request.description,
                "category": CUSTOM_REQUEST_CATEGORY,
                "price": per_unit_price,
                "customRequestId": request_id,
                "userId": request.user_id,
                "activate": false,
            }),
        )?;
        self.store.update(
            collections::CUSTOM_REQUESTS,
            request_id,
            json!({ "status": RequestStatus::Accepted, "productId": product_id }),
        )?;
        Ok(AcceptOutcome::CreatedProduct {
            product_id,
            per_unit_price,
        })
    }

    /// All requests, pending first, for the admin review queue.
    pub fn list_all(&self, session: &Session) -> Result<Vec<CustomRequest>, DomainError> {
        session.require_admin()?;
        let mut requests = parse_requests(self.store.get_all(collections::CUSTOM_REQUESTS)?)?;
        sort_pending_first(&mut requests);
        Ok(requests)
    }

    /// The session user's own requests, pending first.
    pub fn list_for_user(&self, session: &Session) -> Result<Vec<CustomRequest>, DomainError> {
        let docs = self.store.query_eq(
            collections::CUSTOM_REQUESTS,
            "userId",
            &json!(session.user_id),
        )?;
        let mut requests = parse_requests(docs)?;
        sort_pending_first(&mut requests);
        Ok(requests)
    }

    /// Resolve against an admin-held request list: the cached status flips
    /// optimistically and is rolled back if the remote update fails.
    pub fn resolve_cached(
        &self,
        session: &Session,
        cache: &mut Vec<CustomRequest>,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), DomainError> {
        with_rollback(
            cache,
            |cache| {
                if let Some(request) = cache.iter_mut().find(|r| r.id == request_id) {
                    request.status = status;
                }
            },
            || self.resolve(session, request_id, status),
        )
    }

    // ── customer inquiries ───────────────────────────────────────────────────

    pub fn submit_inquiry(&self, session: &Session, question: &str) -> Result<String, DomainError> {
        if question.trim().is_empty() {
            return Err(DomainError::Validation(
                "question must not be empty".to_string(),
            ));
        }
        Ok(self.store.create(
            collections::CUSTOMER_INQUIRY,
            json!({
                "userId": session.user_id,
                "userName": session.display_name,
                "question": question,
                "status": InquiryStatus::Pending,
                "createdAt": Utc::now(),
            }),
        )?)
    }

    /// Attach the answer and mark the inquiry answered in one write.
    pub fn answer_inquiry(
        &self,
        session: &Session,
        inquiry_id: &str,
        answer: &str,
    ) -> Result<(), DomainError> {
        session.require_admin()?;
        if answer.trim().is_empty() {
            return Err(DomainError::Validation(
                "answer must not be empty".to_string(),
            ));
        }
        let doc = self
            .store
            .get(collections::CUSTOMER_INQUIRY, inquiry_id)?
            .ok_or_else(|| {
                DomainError::NotFound(format!("{}/{}", collections::CUSTOMER_INQUIRY, inquiry_id))
            })?;
        let inquiry: CustomerInquiry = serde_json::from_value(doc)
            .map_err(|e| DomainError::Internal(format!("malformed inquiry: {}", e)))?;
        if inquiry.status == InquiryStatus::Answered {
            return Err(DomainError::Validation(
                "inquiry has already been answered".to_string(),
            ));
        }
        self.store.update(
            collections::CUSTOMER_INQUIRY,
            inquiry_id,
            json!({ "status": InquiryStatus::Answered, "answer": answer }),
        )?;
        Ok(())
    }

    pub fn list_all_inquiries(&self, session: &Session) -> Result<Vec<CustomerInquiry>, DomainError> {
        session.require_admin()?;
        let mut inquiries = parse_inquiries(self.store.get_all(collections::CUSTOMER_INQUIRY)?)?;
        inquiries.sort_by_key(|i| i.status != InquiryStatus::Pending);
        Ok(inquiries)
    }

    pub fn list_inquiries_for_user(
        &self,
        session: &Session,
    ) -> Result<Vec<CustomerInquiry>, DomainError> {
        let docs = self.store.query_eq(
            collections::CUSTOMER_INQUIRY,
            "userId",
            &json!(session.user_id),
        )?;
        let mut inquiries = parse_inquiries(docs)?;
        inquiries.sort_by_key(|i| i.status != InquiryStatus::Pending);
        Ok(inquiries)
    }
}

fn parse_requests(docs: Vec<Value>) -> Result<Vec<CustomRequest>, DomainError> {
    docs.into_iter()
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| DomainError::Internal(format!("malformed custom request: {}", e)))
        })
        .collect()
}

fn parse_inquiries(docs: Vec<Value>) -> Result<Vec<CustomerInquiry>, DomainError> {
    docs.into_iter()
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| DomainError::Internal(format!("malformed inquiry: {}", e)))
        })
        .collect()
}

/// Stable, so equal-status items keep their input order; no secondary key.
fn sort_pending_first(requests: &mut [CustomRequest]) {
    requests.sort_by_key(|r| r.status.is_terminal());
}
