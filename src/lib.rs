pub mod application;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use domain::ports::DocumentStore;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::cart::get_cart,
        handlers::cart::add_to_cart,
        handlers::cart::set_cart_quantity,
        handlers::cart::remove_from_cart,
        handlers::favourites::list_favourite_ids,
        handlers::favourites::list_favourite_products,
        handlers::favourites::check_favourite,
        handlers::favourites::set_favourite,
        handlers::requests::submit_request,
        handlers::requests::list_own_requests,
        handlers::requests::list_all_requests,
        handlers::requests::resolve_request,
        handlers::requests::accept_request,
        handlers::inquiries::submit_inquiry,
        handlers::inquiries::list_own_inquiries,
        handlers::inquiries::list_all_inquiries,
        handlers::inquiries::answer_inquiry,
        handlers::catalog::list_products,
        handlers::catalog::list_active_products,
        handlers::catalog::get_product,
        handlers::catalog::create_product,
        handlers::catalog::delete_product,
        handlers::catalog::set_product_price,
        handlers::catalog::set_product_activation,
        handlers::fulfilment::list_own_shipments,
        handlers::fulfilment::list_all_shipments,
        handlers::fulfilment::create_shipment,
        handlers::fulfilment::set_shipment_status,
        handlers::fulfilment::list_own_transactions,
        handlers::fulfilment::record_transaction,
    ),
    components(schemas(
        handlers::CreatedResponse,
        handlers::cart::AddToCartRequest,
        handlers::cart::SetQuantityRequest,
        handlers::cart::CartItemResponse,
        handlers::cart::CartResponse,
        handlers::cart::QuantityChangeResponse,
        handlers::favourites::SetFavouriteRequest,
        handlers::favourites::FavouriteStateResponse,
        handlers::requests::SubmitRequestRequest,
        handlers::requests::ResolveRequestRequest,
        handlers::requests::AcceptRequestRequest,
        handlers::requests::CustomRequestResponse,
        handlers::requests::AcceptRequestResponse,
        handlers::inquiries::SubmitInquiryRequest,
        handlers::inquiries::AnswerInquiryRequest,
        handlers::inquiries::InquiryResponse,
        handlers::catalog::CreateProductRequest,
        handlers::catalog::SetPriceRequest,
        handlers::catalog::SetActivationRequest,
        handlers::catalog::ProductResponse,
        handlers::fulfilment::CreateShipmentRequest,
        handlers::fulfilment::SetShipmentStatusRequest,
        handlers::fulfilment::ShipmentResponse,
        handlers::fulfilment::CreateTransactionRequest,
        handlers::fulfilment::TransactionResponse,
    )),
    tags(
        (name = "cart", description = "Per-user cart reconciliation"),
        (name = "favourites", description = "Favourite product sets"),
        (name = "requests", description = "Custom request workflow"),
        (name = "inquiries", description = "Customer inquiries"),
        (name = "products", description = "Catalog maintenance"),
        (name = "shipments", description = "Shipment tracking"),
        (name = "transactions", description = "Payment history"),
    )
)]
pub struct ApiDoc;

/// Mount every route. Split out of [`build_server`] so integration tests can
/// configure an in-process `App` the same way.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .route("", web::get().to(handlers::cart::get_cart))
            .route("", web::post().to(handlers::cart::add_to_cart))
            .route("/{product_id}", web::put().to(handlers::cart::set_cart_quantity))
            .route("/{product_id}", web::delete().to(handlers::cart::remove_from_cart)),
    )
    .service(
        web::scope("/favourites")
            .route("", web::get().to(handlers::favourites::list_favourite_ids))
            .route("/products", web::get().to(handlers::favourites::list_favourite_products))
            .route("/{product_id}", web::get().to(handlers::favourites::check_favourite))
            .route("/{product_id}", web::put().to(handlers::favourites::set_favourite)),
    )
    .service(
        web::scope("/requests")
            .route("", web::post().to(handlers::requests::submit_request))
            .route("", web::get().to(handlers::requests::list_own_requests))
            .route("/all", web::get().to(handlers::requests::list_all_requests))
            .route("/{id}/resolve", web::post().to(handlers::requests::resolve_request))
            .route("/{id}/accept", web::post().to(handlers::requests::accept_request)),
    )
    .service(
        web::scope("/inquiries")
            .route("", web::post().to(handlers::inquiries::submit_inquiry))
            .route("", web::get().to(handlers::inquiries::list_own_inquiries))
            .route("/all", web::get().to(handlers::inquiries::list_all_inquiries))
            .route("/{id}/answer", web::post().to(handlers::inquiries::answer_inquiry)),
    )
    .service(
        web::scope("/products")
            .route("", web::get().to(handlers::catalog::list_products))
            .route("", web::post().to(handlers::catalog::create_product))
            .route("/active", web::get().to(handlers::catalog::list_active_products))
            .route("/{id}", web::get().to(handlers::catalog::get_product))
            .route("/{id}", web::delete().to(handlers::catalog::delete_product))
            .route("/{id}/price", web::put().to(handlers::catalog::set_product_price))
            .route("/{id}/activation", web::put().to(handlers::catalog::set_product_activation)),
    )
    .service(
        web::scope("/shipments")
            .route("", web::get().to(handlers::fulfilment::list_own_shipments))
            .route("", web::post().to(handlers::fulfilment::create_shipment))
            .route("/all", web::get().to(handlers::fulfilment::list_all_shipments))
            .route("/{id}/status", web::put().to(handlers::fulfilment::set_shipment_status)),
    )
    .service(
        web::scope("/transactions")
            .route("", web::get().to(handlers::fulfilment::list_own_transactions))
            .route("", web::post().to(handlers::fulfilment::record_transaction)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or spawning) the returned
/// server.
pub fn build_server(
    store: Arc<dyn DocumentStore>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(store.clone()))
            .wrap(Logger::default())
            .configure(configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
