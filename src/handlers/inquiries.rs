use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::application::requests::RequestService;
use crate::domain::requests::CustomerInquiry;
use crate::errors::AppError;

use super::{session_from_request, SharedStore};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitInquiryRequest {
    pub question: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerInquiryRequest {
    pub answer: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InquiryResponse {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub question: String,
    pub status: String,
    pub answer: Option<String>,
    pub created_at: String,
}

impl From<CustomerInquiry> for InquiryResponse {
    fn from(i: CustomerInquiry) -> Self {
        InquiryResponse {
            id: i.id,
            user_id: i.user_id,
            user_name: i.user_name,
            question: i.question,
            status: i.status.to_string(),
            answer: i.answer,
            created_at: i.created_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /inquiries
#[utoipa::path(
    post,
    path = "/inquiries",
    request_body = SubmitInquiryRequest,
    responses(
        (status = 201, description = "Inquiry created", body = super::CreatedResponse),
        (status = 400, description = "Blank question"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inquiries"
)]
pub async fn submit_inquiry(
    req: HttpRequest,
    store: SharedStore,
    body: web::Json<SubmitInquiryRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let question = body.into_inner().question;

    let id = web::block(move || {
        let service = RequestService::new(store);
        Ok::<_, AppError>(service.submit_inquiry(&session, &question)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// GET /inquiries
///
/// The session user's inquiries, pending first.
#[utoipa::path(
    get,
    path = "/inquiries",
    responses(
        (status = 200, description = "Own inquiries", body = [InquiryResponse]),
        (status = 400, description = "Missing identity headers"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inquiries"
)]
pub async fn list_own_inquiries(
    req: HttpRequest,
    store: SharedStore,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();

    let inquiries = web::block(move || {
        let service = RequestService::new(store);
        Ok::<_, AppError>(service.list_inquiries_for_user(&session)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<InquiryResponse> = inquiries.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /inquiries/all
#[utoipa::path(
    get,
    path = "/inquiries/all",
    responses(
        (status = 200, description = "All inquiries", body = [InquiryResponse]),
        (status = 400, description = "Missing admin role"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inquiries"
)]
pub async fn list_all_inquiries(
    req: HttpRequest,
    store: SharedStore,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();

    let inquiries = web::block(move || {
        let service = RequestService::new(store);
        Ok::<_, AppError>(service.list_all_inquiries(&session)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<InquiryResponse> = inquiries.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// POST /inquiries/{id}/answer
///
/// Store the answer and mark the inquiry answered in one write.
#[utoipa::path(
    post,
    path = "/inquiries/{id}/answer",
    params(("id" = String, Path, description = "Inquiry id")),
    request_body = AnswerInquiryRequest,
    responses(
        (status = 204, description = "Inquiry answered"),
        (status = 400, description = "Blank answer, already answered, or missing admin role"),
        (status = 404, description = "Inquiry not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inquiries"
)]
pub async fn answer_inquiry(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
    body: web::Json<AnswerInquiryRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let inquiry_id = path.into_inner();
    let answer = body.into_inner().answer;

    web::block(move || {
        let service = RequestService::new(store);
        Ok::<_, AppError>(service.answer_inquiry(&session, &inquiry_id, &answer)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
