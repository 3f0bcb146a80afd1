//! Router configuration for the web server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Catalog façade
        .route("/add_product", post(handlers::add_product))
        .route("/products", get(handlers::list_products))
        // Entity-extraction playground
        .route("/", get(handlers::extractor_page))
        .route("/extract", post(handlers::extract_submit))
        .route("/api/extract", post(handlers::api_extract))
        // Health and static assets
        .route("/health", get(handlers::health))
        .route("/static/style.css", get(handlers::serve_css))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
