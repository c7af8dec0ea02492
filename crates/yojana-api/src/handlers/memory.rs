//! Case memory update handler.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use yojana_core::MemoryUpdate;

use crate::{ApiError, AppState};

/// Record status, feedback, notes or the chosen scheme for a saved case.
pub async fn update_memory(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    Json(update): Json<MemoryUpdate>,
) -> Result<Json<Value>, ApiError> {
    state
        .orchestrator
        .memory()
        .update(case_id, &update)
        .await?;
    Ok(Json(json!({"status": "updated"})))
}
