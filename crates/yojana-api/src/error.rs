//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Request rejected before reaching the pipeline.
    BadRequest(String),
    /// Failure raised by the pipeline or one of its collaborators.
    Core(yojana_core::Error),
}

impl From<yojana_core::Error> for ApiError {
    fn from(err: yojana_core::Error) -> Self {
        ApiError::Core(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                yojana_core::Error::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
                yojana_core::Error::Validation(_) => StatusCode::BAD_REQUEST,
                yojana_core::Error::ExternalService(_)
                | yojana_core::Error::Parse(_)
                | yojana_core::Error::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "validation_error",
            ApiError::Core(err) => err.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Core(err) => err.to_string(),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), kind, "{}", message);
        } else {
            warn!(status = status.as_u16(), kind, "{}", message);
        }

        let body = Json(serde_json::json!({
            "error": message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}
