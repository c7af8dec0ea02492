//! Eligibility analysis handler.

use axum::{extract::State, Json};
use base64::Engine;

use yojana_core::{AnalyzeInput, AnalyzeResult};
use yojana_inference::strip_data_url;

use crate::{ApiError, AppState};

/// Reject photos that are not valid base64 before any model is called.
fn check_photo(input: &AnalyzeInput) -> Result<(), ApiError> {
    let Some(photo) = input.image_base64.as_deref() else {
        return Ok(());
    };
    if photo.trim().is_empty() {
        return Ok(());
    }
    base64::engine::general_purpose::STANDARD
        .decode(strip_data_url(photo))
        .map_err(|e| ApiError::BadRequest(format!("Invalid base64 image data: {}", e)))?;
    Ok(())
}

/// Run one eligibility analysis.
///
/// # Returns
/// - 200 OK with the merged signals, scheme explanations, recalled memories
///   and the id of the saved case
/// - 400 Bad Request on invalid base64 or vision without a photo
/// - 502 Bad Gateway when a model or the vector store fails
/// - 503 Service Unavailable when credentials are not configured
pub async fn analyze(
    State(state): State<AppState>,
    Json(input): Json<AnalyzeInput>,
) -> Result<Json<AnalyzeResult>, ApiError> {
    let input = input.normalized();
    check_photo(&input)?;
    let result = state.orchestrator.run(&input).await?;
    Ok(Json(result))
}
