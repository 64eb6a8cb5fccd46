use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::application::catalog::{CatalogService, NewProduct};
use crate::application::pricing;
use crate::domain::catalog::Product;
use crate::errors::AppError;

use super::{session_from_request, SharedStore};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    #[serde(default)]
    pub description: String,
    pub picture_url: Option<String>,
    pub seller: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPriceRequest {
    /// Decimal price as a string, e.g. "9.99"
    pub price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActivationRequest {
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    /// Price rendered for display, e.g. "1,234.50"
    pub display_price: String,
    pub picture_url: Option<String>,
    pub activate: bool,
    pub description: String,
    pub rating: Option<f64>,
    pub custom_request_id: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        let display_price = pricing::format_price(&p.price);
        ProductResponse {
            id: p.id,
            name: p.name,
            category: p.category,
            price: p.price.to_string(),
            display_price,
            picture_url: p.picture_url,
            activate: p.activate,
            description: p.description,
            rating: p.rating,
            custom_request_id: p.custom_request_id,
        }
    }
}

pub(super) fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("invalid price '{}': {}", raw, e)))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// The full catalog, active or not.
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(store: SharedStore) -> Result<HttpResponse, AppError> {
    let store = store.get_ref().clone();
    let products = web::block(move || {
        let catalog = CatalogService::new(store);
        Ok::<_, AppError>(catalog.list_products()?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /products/active
///
/// Only products currently listed for sale.
#[utoipa::path(
    get,
    path = "/products/active",
    responses(
        (status = 200, description = "Active products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_active_products(store: SharedStore) -> Result<HttpResponse, AppError> {
    let store = store.get_ref().clone();
    let products = web::block(move || {
        let catalog = CatalogService::new(store);
        Ok::<_, AppError>(catalog.list_active_products()?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product(
    store: SharedStore,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref().clone();
    let product_id = path.into_inner();

    let product = web::block(move || {
        let catalog = CatalogService::new(store);
        Ok::<_, AppError>(catalog.get_product(&product_id)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(p) => Ok(HttpResponse::Ok().json(ProductResponse::from(p))),
        None => Err(AppError::NotFound("product".to_string())),
    }
}

/// POST /products
///
/// Admin only. New products start deactivated.
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = super::CreatedResponse),
        (status = 400, description = "Invalid input or missing admin role"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn create_product(
    req: HttpRequest,
    store: SharedStore,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let body = body.into_inner();
    let price = parse_price(&body.price)?;

    let id = web::block(move || {
        let catalog = CatalogService::new(store);
        Ok::<_, AppError>(catalog.add_product(
            &session,
            NewProduct {
                name: body.name,
                category: body.category,
                price,
                description: body.description,
                picture_url: body.picture_url,
                seller: body.seller,
            },
        )?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Missing admin role"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let product_id = path.into_inner();

    web::block(move || {
        let catalog = CatalogService::new(store);
        Ok::<_, AppError>(catalog.delete_product(&session, &product_id)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// PUT /products/{id}/price
#[utoipa::path(
    put,
    path = "/products/{id}/price",
    params(("id" = String, Path, description = "Product id")),
    request_body = SetPriceRequest,
    responses(
        (status = 204, description = "Price updated"),
        (status = 400, description = "Invalid price or missing admin role"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn set_product_price(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
    body: web::Json<SetPriceRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let product_id = path.into_inner();
    let price = parse_price(&body.price)?;

    web::block(move || {
        let catalog = CatalogService::new(store);
        Ok::<_, AppError>(catalog.update_price(&session, &product_id, price)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// PUT /products/{id}/activation
#[utoipa::path(
    put,
    path = "/products/{id}/activation",
    params(("id" = String, Path, description = "Product id")),
    request_body = SetActivationRequest,
    responses(
        (status = 204, description = "Activation updated"),
        (status = 400, description = "Missing admin role"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn set_product_activation(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
    body: web::Json<SetActivationRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let product_id = path.into_inner();
    let active = body.active;

    web::block(move || {
        let catalog = CatalogService::new(store);
        Ok::<_, AppError>(catalog.set_activation(&session, &product_id, active)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
