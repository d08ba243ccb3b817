//! Batch standardize endpoint.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiResult;
use crate::types;
use crate::AppState;

/// POST /standardize
///
/// Body is either a plain JSON list of records or `{"rows": [...]}`.
/// A malformed or non-JSON body is treated as an empty record list, not
/// an error. Each record comes back with the two derived fields
/// attached, in the original order, all other fields untouched.
pub async fn standardize(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let rows = serde_json::from_slice::<Value>(&body)
        .map(types::rows_from_value)
        .unwrap_or_default();

    debug!(rows = rows.len(), "Standardize request");
    let out = state.batch.standardize_rows(rows).await?;

    Ok(Json(json!({ "rows": out })))
}

/// Build standardize routes
pub fn standardize_routes() -> Router<AppState> {
    Router::new().route("/standardize", post(standardize))
}
