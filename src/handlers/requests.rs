use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::application::pricing;
use crate::application::requests::{AcceptOutcome, NewRequest, RequestService};
use crate::domain::requests::CustomRequest;
use crate::errors::AppError;

use super::catalog::parse_price;
use super::{session_from_request, SharedStore};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitRequestRequest {
    pub description: String,
    pub quantity: u32,
    /// Product the request refers to, when it concerns an existing item.
    pub product_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveRequestRequest {
    /// "accepted" or "denied"
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AcceptRequestRequest {
    /// Total price for the whole requested quantity, as a decimal string.
    pub total_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomRequestResponse {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub description: String,
    pub quantity: u32,
    pub status: String,
    pub product_id: Option<String>,
    pub created_at: String,
}

impl From<CustomRequest> for CustomRequestResponse {
    fn from(r: CustomRequest) -> Self {
        CustomRequestResponse {
            id: r.id,
            user_id: r.user_id,
            user_name: r.user_name,
            description: r.description,
            quantity: r.quantity,
            status: r.status.to_string(),
            product_id: r.product_id,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AcceptRequestResponse {
    /// "created" when a new product was built, "linked" when an existing
    /// one was reused.
    pub outcome: String,
    pub product_id: String,
    /// Derived unit price, present only when a product was created.
    pub per_unit_price: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /requests
#[utoipa::path(
    post,
    path = "/requests",
    request_body = SubmitRequestRequest,
    responses(
        (status = 201, description = "Request created", body = super::CreatedResponse),
        (status = 400, description = "Blank description or zero quantity"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "requests"
)]
pub async fn submit_request(
    req: HttpRequest,
    store: SharedStore,
    body: web::Json<SubmitRequestRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let body = body.into_inner();

    let id = web::block(move || {
        let requests = RequestService::new(store);
        Ok::<_, AppError>(requests.submit(
            &session,
            NewRequest {
                description: body.description,
                quantity: body.quantity,
                product_id: body.product_id,
            },
        )?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// GET /requests
///
/// The session user's requests, pending first.
#[utoipa::path(
    get,
    path = "/requests",
    responses(
        (status = 200, description = "Own requests", body = [CustomRequestResponse]),
        (status = 400, description = "Missing identity headers"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "requests"
)]
pub async fn list_own_requests(
    req: HttpRequest,
    store: SharedStore,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();

    let requests = web::block(move || {
        let service = RequestService::new(store);
        Ok::<_, AppError>(service.list_for_user(&session)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<CustomRequestResponse> = requests.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /requests/all
///
/// Admin review queue over every user's requests, pending first.
#[utoipa::path(
    get,
    path = "/requests/all",
    responses(
        (status = 200, description = "All requests", body = [CustomRequestResponse]),
        (status = 400, description = "Missing admin role"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "requests"
)]
pub async fn list_all_requests(
    req: HttpRequest,
    store: SharedStore,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();

    let requests = web::block(move || {
        let service = RequestService::new(store);
        Ok::<_, AppError>(service.list_all(&session)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<CustomRequestResponse> = requests.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// POST /requests/{id}/resolve
///
/// Accept or deny without touching the catalog.
#[utoipa::path(
    post,
    path = "/requests/{id}/resolve",
    params(("id" = String, Path, description = "Request id")),
    request_body = ResolveRequestRequest,
    responses(
        (status = 204, description = "Request resolved"),
        (status = 400, description = "Invalid status, already resolved, or missing admin role"),
        (status = 404, description = "Request not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "requests"
)]
pub async fn resolve_request(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
    body: web::Json<ResolveRequestRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let request_id = path.into_inner();
    let status = body
        .status
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;

    web::block(move || {
        let service = RequestService::new(store);
        Ok::<_, AppError>(service.resolve(&session, &request_id, status)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /requests/{id}/accept
///
/// Accept with an admin-entered total; the unit price is derived and a
/// catalog product is created (or an existing one linked). Safe to retry.
#[utoipa::path(
    post,
    path = "/requests/{id}/accept",
    params(("id" = String, Path, description = "Request id")),
    request_body = AcceptRequestRequest,
    responses(
        (status = 200, description = "Request accepted", body = AcceptRequestResponse),
        (status = 400, description = "Invalid total, already resolved, or missing admin role"),
        (status = 404, description = "Request not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "requests"
)]
pub async fn accept_request(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
    body: web::Json<AcceptRequestRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let request_id = path.into_inner();
    let total = parse_price(&body.total_price)?;

    let outcome = web::block(move || {
        let service = RequestService::new(store);
        Ok::<_, AppError>(service.accept_with_price(&session, &request_id, total)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let response = match outcome {
        AcceptOutcome::LinkedExisting { product_id } => AcceptRequestResponse {
            outcome: "linked".to_string(),
            product_id,
            per_unit_price: None,
        },
        AcceptOutcome::CreatedProduct {
            product_id,
            per_unit_price,
        } => AcceptRequestResponse {
            outcome: "created".to_string(),
            product_id,
            per_unit_price: Some(pricing::format_price(&per_unit_price)),
        },
    };
    Ok(HttpResponse::Ok().json(response))
}
