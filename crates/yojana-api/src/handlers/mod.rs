//! HTTP handlers for yojana-api.

use axum::Json;
use serde_json::{json, Value};

pub mod analyze;
pub mod memory;

/// Liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
