use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::favourites::FavouritesService;
use crate::errors::AppError;

use super::catalog::ProductResponse;
use super::{session_from_request, SharedStore};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetFavouriteRequest {
    /// Desired end state; repeating the call is a no-op.
    pub favourite: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavouriteStateResponse {
    pub product_id: String,
    pub favourite: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /favourites
///
/// The session user's favourite product ids.
#[utoipa::path(
    get,
    path = "/favourites",
    responses(
        (status = 200, description = "Favourite product ids", body = [String]),
        (status = 400, description = "Missing identity headers"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "favourites"
)]
pub async fn list_favourite_ids(
    req: HttpRequest,
    store: SharedStore,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();

    let ids = web::block(move || {
        let favourites = FavouritesService::new(store);
        Ok::<_, AppError>(favourites.get_favourite_ids(&session)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ids))
}

/// GET /favourites/products
///
/// The favourite set resolved to full product records.
#[utoipa::path(
    get,
    path = "/favourites/products",
    responses(
        (status = 200, description = "Favourite products", body = [ProductResponse]),
        (status = 400, description = "Missing identity headers"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "favourites"
)]
pub async fn list_favourite_products(
    req: HttpRequest,
    store: SharedStore,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();

    let products = web::block(move || {
        let favourites = FavouritesService::new(store);
        Ok::<_, AppError>(favourites.get_favourite_products(&session)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /favourites/{product_id}
#[utoipa::path(
    get,
    path = "/favourites/{product_id}",
    params(("product_id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Membership state", body = FavouriteStateResponse),
        (status = 400, description = "Missing identity headers"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "favourites"
)]
pub async fn check_favourite(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let product_id = path.into_inner();

    let response = web::block(move || {
        let favourites = FavouritesService::new(store);
        let favourite = favourites.is_favourite(&session, &product_id)?;
        Ok::<_, AppError>(FavouriteStateResponse {
            product_id,
            favourite,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}

/// PUT /favourites/{product_id}
///
/// Idempotent set/unset keyed by the desired end state.
#[utoipa::path(
    put,
    path = "/favourites/{product_id}",
    params(("product_id" = String, Path, description = "Product id")),
    request_body = SetFavouriteRequest,
    responses(
        (status = 200, description = "New membership state", body = FavouriteStateResponse),
        (status = 400, description = "Missing identity headers"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "favourites"
)]
pub async fn set_favourite(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
    body: web::Json<SetFavouriteRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let product_id = path.into_inner();
    let desired = body.favourite;

    let response = web::block(move || {
        let favourites = FavouritesService::new(store);
        favourites.set_favourite(&session, &product_id, desired)?;
        Ok::<_, AppError>(FavouriteStateResponse {
            product_id,
            favourite: desired,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}
