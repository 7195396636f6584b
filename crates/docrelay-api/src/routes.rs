//! Router assembly.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers::{document_types, health, submit};
use crate::state::AppState;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_document_size_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/document/v1/documentTypes",
            get(document_types::document_types),
        )
        .route("/document/v1/submit", post(submit::submit))
        .route("/document/v1/submitForm", post(submit::submit_form))
        .route(
            "/api-doc/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
