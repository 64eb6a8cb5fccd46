use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::application::fulfilment::{FulfilmentService, NewShipment, NewTransaction};
use crate::application::pricing;
use crate::domain::fulfilment::{Shipment, Transaction};
use crate::errors::AppError;

use super::catalog::parse_price;
use super::{session_from_request, SharedStore};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShipmentRequest {
    pub order_id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub product_id: Option<String>,
    /// Free-form delivery estimate shown to the customer, e.g. "2026-09-15".
    pub expected_delivery: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetShipmentStatusRequest {
    /// One of "Pending", "Shipped", "In Transit", "Delivered", "Cancelled".
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentResponse {
    pub id: String,
    pub order_id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub product_id: Option<String>,
    pub status: String,
    pub expected_delivery: String,
}

impl From<Shipment> for ShipmentResponse {
    fn from(s: Shipment) -> Self {
        ShipmentResponse {
            id: s.id,
            order_id: s.order_id,
            user_id: s.user_id,
            user_name: s.user_name,
            product_id: s.product_id,
            status: s.status.to_string(),
            expected_delivery: s.expected_delivery,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub order_id: String,
    /// Decimal amount as a string, e.g. "24.00"
    pub amount: String,
    pub status: String,
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub id: String,
    pub user_id: String,
    pub order_id: String,
    pub amount: String,
    pub display_amount: String,
    pub date: String,
    pub status: String,
    pub payment_method: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        let display_amount = pricing::format_price(&t.amount);
        TransactionResponse {
            id: t.id,
            user_id: t.user_id,
            order_id: t.order_id,
            amount: t.amount.to_string(),
            display_amount,
            date: t.date.to_rfc3339(),
            status: t.status,
            payment_method: t.payment_method,
        }
    }
}

// ── Shipment handlers ────────────────────────────────────────────────────────

/// GET /shipments
///
/// The session user's shipments.
#[utoipa::path(
    get,
    path = "/shipments",
    responses(
        (status = 200, description = "Own shipments", body = [ShipmentResponse]),
        (status = 400, description = "Missing identity headers"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "shipments"
)]
pub async fn list_own_shipments(
    req: HttpRequest,
    store: SharedStore,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();

    let shipments = web::block(move || {
        let service = FulfilmentService::new(store);
        Ok::<_, AppError>(service.shipments_for_user(&session)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<ShipmentResponse> = shipments.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /shipments/all
#[utoipa::path(
    get,
    path = "/shipments/all",
    responses(
        (status = 200, description = "All shipments", body = [ShipmentResponse]),
        (status = 400, description = "Missing admin role"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "shipments"
)]
pub async fn list_all_shipments(
    req: HttpRequest,
    store: SharedStore,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();

    let shipments = web::block(move || {
        let service = FulfilmentService::new(store);
        Ok::<_, AppError>(service.list_all_shipments(&session)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<ShipmentResponse> = shipments.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// POST /shipments
#[utoipa::path(
    post,
    path = "/shipments",
    request_body = CreateShipmentRequest,
    responses(
        (status = 201, description = "Shipment created", body = super::CreatedResponse),
        (status = 400, description = "Invalid input or missing admin role"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "shipments"
)]
pub async fn create_shipment(
    req: HttpRequest,
    store: SharedStore,
    body: web::Json<CreateShipmentRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let body = body.into_inner();

    let id = web::block(move || {
        let service = FulfilmentService::new(store);
        Ok::<_, AppError>(service.add_shipment(
            &session,
            NewShipment {
                order_id: body.order_id,
                user_id: body.user_id,
                user_name: body.user_name,
                product_id: body.product_id,
                expected_delivery: body.expected_delivery,
            },
        )?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// PUT /shipments/{id}/status
///
/// Move a shipment along its lifecycle. Delivered and cancelled shipments
/// are frozen.
#[utoipa::path(
    put,
    path = "/shipments/{id}/status",
    params(("id" = String, Path, description = "Shipment id")),
    request_body = SetShipmentStatusRequest,
    responses(
        (status = 204, description = "Status updated"),
        (status = 400, description = "Invalid status, terminal shipment, or missing admin role"),
        (status = 404, description = "Shipment not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "shipments"
)]
pub async fn set_shipment_status(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
    body: web::Json<SetShipmentStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let shipment_id = path.into_inner();
    let status = body
        .status
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;

    web::block(move || {
        let service = FulfilmentService::new(store);
        Ok::<_, AppError>(service.update_shipment_status(&session, &shipment_id, status)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

// ── Transaction handlers ─────────────────────────────────────────────────────

/// GET /transactions
///
/// The session user's payment history, newest first.
#[utoipa::path(
    get,
    path = "/transactions",
    responses(
        (status = 200, description = "Own transactions", body = [TransactionResponse]),
        (status = 400, description = "Missing identity headers"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "transactions"
)]
pub async fn list_own_transactions(
    req: HttpRequest,
    store: SharedStore,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();

    let transactions = web::block(move || {
        let service = FulfilmentService::new(store);
        Ok::<_, AppError>(service.transactions_for_user(&session)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<TransactionResponse> = transactions.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// POST /transactions
#[utoipa::path(
    post,
    path = "/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = super::CreatedResponse),
        (status = 400, description = "Non-positive amount"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "transactions"
)]
pub async fn record_transaction(
    req: HttpRequest,
    store: SharedStore,
    body: web::Json<CreateTransactionRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let body = body.into_inner();
    let amount = parse_price(&body.amount)?;

    let id = web::block(move || {
        let service = FulfilmentService::new(store);
        Ok::<_, AppError>(service.record_transaction(
            &session,
            NewTransaction {
                order_id: body.order_id,
                amount,
                status: body.status,
                payment_method: body.payment_method,
            },
        )?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}
