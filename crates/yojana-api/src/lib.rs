//! # yojana-api
//!
//! HTTP surface over the yojana pipeline.
//!
//! Routes:
//! - `GET /health`
//! - `POST /api/v1/analyze`
//! - `POST /api/v1/memory/:case_id`

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use yojana_pipeline::Orchestrator;

pub mod error;
pub mod handlers;

pub use error::ApiError;

/// Largest accepted request body; photos arrive base64-encoded inline.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/analyze", post(handlers::analyze::analyze))
        .route(
            "/api/v1/memory/:case_id",
            post(handlers::memory::update_memory),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
