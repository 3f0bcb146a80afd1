//! Request handlers for the catalog façade and the extraction playground.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json};
use axum::Form;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::models::{ADD_PRODUCT_ACK, LIST_CATEGORY, PRODUCTS_QUERY};

use super::{assets, templates, AppState};

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// POST /add_product - insert an arbitrary record into the store.
///
/// The body is forwarded to the store as-is; no validation, no idempotence
/// guarantee. Duplicate inserts are the store's concern.
pub async fn add_product(
    State(state): State<AppState>,
    Json(item): Json<Value>,
) -> impl IntoResponse {
    match state.store.create_item(&item).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": ADD_PRODUCT_ACK })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to add product: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /products - all records matching the fixed category filter.
pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    let result = state
        .store
        .query_items(PRODUCTS_QUERY, &[("@category", json!(LIST_CATEGORY))])
        .await;

    match result {
        Ok(products) => {
            (StatusCode::OK, Json(json!({ "products": products }))).into_response()
        }
        Err(e) => {
            error!("Failed to list products: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET / - the entity-extractor page with a pre-filled sample text.
pub async fn extractor_page() -> impl IntoResponse {
    Html(templates::extractor_page(templates::SAMPLE_TEXT))
}

/// Form payload for the extraction page.
#[derive(Debug, Deserialize)]
pub struct ExtractForm {
    #[serde(default)]
    pub text: String,
}

/// POST /extract - run the model over the submitted text and render the
/// result table, or the "no entities" notice.
pub async fn extract_submit(
    State(state): State<AppState>,
    Form(form): Form<ExtractForm>,
) -> impl IntoResponse {
    let text = form.text.trim();
    if text.is_empty() {
        // Nothing to analyze; show the input form again with whatever
        // was submitted, not the sample text
        return Html(templates::extractor_page(&form.text)).into_response();
    }

    match state.ner.extract_entities(text).await {
        Ok(entities) => Html(templates::results_page(text, &entities)).into_response(),
        Err(e) => {
            error!("Entity extraction failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Html(templates::error_page(&e.to_string())),
            )
                .into_response()
        }
    }
}

/// JSON payload for the extraction API.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

/// POST /api/extract - JSON variant of the extractor.
pub async fn api_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (StatusCode::OK, Json(json!({ "entities": [] }))).into_response();
    }

    match state.ner.extract_entities(&req.text).await {
        Ok(entities) => {
            (StatusCode::OK, Json(json!({ "entities": entities }))).into_response()
        }
        Err(e) => {
            error!("Entity extraction failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /static/style.css - embedded stylesheet.
pub async fn serve_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], assets::CSS)
}
