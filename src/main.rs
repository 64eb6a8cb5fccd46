use std::env;
use std::sync::Arc;

use dotenvy::dotenv;

use storefront_service::build_server;
use storefront_service::domain::ports::DocumentStore;
use storefront_service::infrastructure::MemoryStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(store, &host, port)?.await
}
