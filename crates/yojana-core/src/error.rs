//! Error types for yojana.

use thiserror::Error;

/// Result type alias using yojana's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for yojana operations.
///
/// None of these are caught or retried inside the pipeline; the first one
/// raised aborts an orchestration run and reaches the caller unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or placeholder credential, or otherwise unusable configuration.
    /// Always raised before any network call is attempted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller input that cannot be acted upon (e.g. vision without a photo).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport failure or non-success status from an external endpoint.
    /// The message is the response body text when one was returned.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Vision reply without usable text, or text that is not JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Successful response whose content does not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Local serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable kind, used by callers for presentation.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "configuration_error",
            Error::Validation(_) => "validation_error",
            Error::ExternalService(_) => "external_service_error",
            Error::Parse(_) => "parse_error",
            Error::MalformedResponse(_) => "malformed_response_error",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
        }
    }
}

/// Convert a non-success HTTP response into [`Error::ExternalService`],
/// using the body text as the message when there is one.
pub async fn service_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "External service returned non-success status");
    if body.trim().is_empty() {
        Error::ExternalService(format!("Request failed ({})", status))
    } else {
        Error::ExternalService(body)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::ExternalService(e.to_string())
    }
}
