//! Vector store connection settings and collection names.

use yojana_core::defaults::{
    ENV_MEMORY_COLLECTION, ENV_QDRANT_API_KEY, ENV_QDRANT_TIMEOUT, ENV_QDRANT_URL,
    ENV_SCHEMES_COLLECTION, MEMORY_COLLECTION, SCHEMES_COLLECTION, STORE_TIMEOUT_SECS,
};

/// Connection settings for a Qdrant deployment.
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// Base URL of the Qdrant REST endpoint; required before any request.
    pub url: Option<String>,
    /// API key sent as the `api-key` header; required before any request.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_seconds: STORE_TIMEOUT_SECS,
        }
    }
}

impl QdrantConfig {
    /// Read configuration from environment variables.
    ///
    /// Reads:
    /// - `QDRANT_URL`
    /// - `QDRANT_API_KEY`
    /// - `QDRANT_TIMEOUT` (default: 60 seconds)
    pub fn from_env() -> Self {
        Self {
            url: std::env::var(ENV_QDRANT_URL).ok(),
            api_key: std::env::var(ENV_QDRANT_API_KEY).ok(),
            timeout_seconds: std::env::var(ENV_QDRANT_TIMEOUT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(STORE_TIMEOUT_SECS),
        }
    }
}

/// Names of the two collections yojana reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub schemes: String,
    pub memories: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            schemes: SCHEMES_COLLECTION.to_string(),
            memories: MEMORY_COLLECTION.to_string(),
        }
    }
}

impl Collections {
    /// Read collection overrides from `QDRANT_SCHEMES_COLLECTION` and
    /// `QDRANT_MEMORY_COLLECTION`.
    pub fn from_env() -> Self {
        Self {
            schemes: std::env::var(ENV_SCHEMES_COLLECTION)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| SCHEMES_COLLECTION.to_string()),
            memories: std::env::var(ENV_MEMORY_COLLECTION)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| MEMORY_COLLECTION.to_string()),
        }
    }
}
