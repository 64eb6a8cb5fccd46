use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::cart::CartService;
use crate::application::pricing;
use crate::domain::cart::{CartProduct, QuantityOutcome};
use crate::errors::AppError;

use super::catalog::ProductResponse;
use super::{session_from_request, SharedStore};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetQuantityRequest {
    pub quantity: i64,
    /// Set when the user has confirmed a bulk order after being prompted.
    #[serde(default)]
    pub confirm_bulk: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub product: ProductResponse,
    pub quantity: i64,
    /// Line total (unit price times quantity), rendered for display.
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    /// Cart total rendered for display, e.g. "1,234.50"
    pub total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuantityChangeResponse {
    /// One of "updated", "removed", "requires_confirmation", "escalated".
    pub outcome: String,
    /// Custom request id when the outcome is "escalated".
    pub request_id: Option<String>,
}

fn cart_response(items: Vec<CartProduct>) -> CartResponse {
    let total = items.iter().fold(BigDecimal::from(0), |acc, item| {
        acc + &item.product.price * BigDecimal::from(item.quantity)
    });
    let items = items
        .into_iter()
        .map(|item| {
            let line_total = &item.product.price * BigDecimal::from(item.quantity);
            CartItemResponse {
                line_total: pricing::format_price(&line_total),
                quantity: item.quantity,
                product: item.product.into(),
            }
        })
        .collect();
    CartResponse {
        items,
        total: pricing::format_price(&total),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
///
/// The session user's cart with every line resolved to its product and the
/// running total. Lines whose product no longer exists are omitted.
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Resolved cart", body = CartResponse),
        (status = 400, description = "Missing identity headers"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn get_cart(req: HttpRequest, store: SharedStore) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();

    let items = web::block(move || {
        let cart = CartService::new(store);
        Ok::<_, AppError>(cart.get_cart_products(&session)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(cart_response(items)))
}

/// POST /cart
///
/// Add units of a product. Repeated adds accumulate.
#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 204, description = "Line added or bumped"),
        (status = 400, description = "Non-positive quantity"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    req: HttpRequest,
    store: SharedStore,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let body = body.into_inner();

    web::block(move || {
        let cart = CartService::new(store);
        Ok::<_, AppError>(cart.add_to_cart(&session, &body.product_id, body.quantity)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// PUT /cart/{product_id}
///
/// Overwrite a line's quantity. Zero removes the line. A quantity over the
/// bulk threshold returns `requires_confirmation` without writing anything;
/// repeating the call with `confirm_bulk` set files a custom request for
/// admin review instead and leaves the cart untouched.
#[utoipa::path(
    put,
    path = "/cart/{product_id}",
    params(("product_id" = String, Path, description = "Product id")),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Outcome of the change", body = QuantityChangeResponse),
        (status = 400, description = "Missing identity headers"),
        (status = 404, description = "Product not found (bulk confirmation only)"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn set_cart_quantity(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
    body: web::Json<SetQuantityRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let product_id = path.into_inner();
    let body = body.into_inner();

    let response = web::block(move || {
        let cart = CartService::new(store);
        match cart.set_quantity(&session, &product_id, body.quantity)? {
            QuantityOutcome::Updated => Ok::<_, AppError>(QuantityChangeResponse {
                outcome: "updated".to_string(),
                request_id: None,
            }),
            QuantityOutcome::Removed => Ok(QuantityChangeResponse {
                outcome: "removed".to_string(),
                request_id: None,
            }),
            QuantityOutcome::NeedsConfirmation => {
                if body.confirm_bulk {
                    let request_id =
                        cart.escalate_bulk_order(&session, &product_id, body.quantity)?;
                    Ok(QuantityChangeResponse {
                        outcome: "escalated".to_string(),
                        request_id: Some(request_id),
                    })
                } else {
                    Ok(QuantityChangeResponse {
                        outcome: "requires_confirmation".to_string(),
                        request_id: None,
                    })
                }
            }
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /cart/{product_id}
#[utoipa::path(
    delete,
    path = "/cart/{product_id}",
    params(("product_id" = String, Path, description = "Product id")),
    responses(
        (status = 204, description = "Line removed (or was already absent)"),
        (status = 400, description = "Missing identity headers"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn remove_from_cart(
    req: HttpRequest,
    store: SharedStore,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = session_from_request(&req)?;
    let store = store.get_ref().clone();
    let product_id = path.into_inner();

    web::block(move || {
        let cart = CartService::new(store);
        cart.set_quantity(&session, &product_id, 0)?;
        Ok::<_, AppError>(())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
