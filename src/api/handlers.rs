//! HTTP request handlers

use axum::{routing::any, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

/// Create the liveness router
pub fn create_router() -> Router {
    Router::new()
        .route("/", any(health))
        .route("/health", any(health))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn fallback() -> &'static str {
    "ok"
}
