//! Health check endpoint.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

/// GET /
///
/// Liveness check. The body is exactly `{"ok": true}`; this stays
/// available even when the model backend is unreachable.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}
