//! Centralized default constants for yojana.
//!
//! Every crate references these instead of defining its own magic values.

// =============================================================================
// INFERENCE (OpenAI-compatible)
// =============================================================================

/// Default OpenAI-compatible API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default embedding model.
pub const EMBED_MODEL: &str = "text-embedding-3-small";

/// Default embedding dimension for text-embedding-3-small.
pub const EMBED_DIMENSION: usize = 1536;

/// Default multimodal model used for photo signal extraction.
pub const VISION_MODEL: &str = "gpt-4o-mini";

/// Default inference request timeout in seconds.
pub const INFERENCE_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// VECTOR STORE (Qdrant)
// =============================================================================

/// Collection holding welfare scheme descriptions.
pub const SCHEMES_COLLECTION: &str = "gov_schemes";

/// Collection holding persisted case memories.
pub const MEMORY_COLLECTION: &str = "case_memory";

/// Result cap for both scheme search and memory recall.
pub const SEARCH_LIMIT: usize = 3;

/// Default vector store request timeout in seconds.
pub const STORE_TIMEOUT_SECS: u64 = 60;

/// Prefix marking an unedited credential template value.
pub const CREDENTIAL_PLACEHOLDER_PREFIX: &str = "YOUR_";

// =============================================================================
// SIGNALS
// =============================================================================

/// Note attached to the signal record used when vision is not requested.
pub const FALLBACK_NOTE: &str = "Fallback signals (no vision API).";

/// Wildcard state marker for nationwide schemes.
pub const ALL_STATES: &str = "All";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

// =============================================================================
// ENVIRONMENT VARIABLE NAMES
// =============================================================================

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_EMBED_MODEL: &str = "OPENAI_EMBED_MODEL";
pub const ENV_OPENAI_VISION_MODEL: &str = "OPENAI_VISION_MODEL";
pub const ENV_OPENAI_EMBED_DIM: &str = "OPENAI_EMBED_DIM";
pub const ENV_OPENAI_TIMEOUT: &str = "OPENAI_TIMEOUT";
pub const ENV_QDRANT_URL: &str = "QDRANT_URL";
pub const ENV_QDRANT_API_KEY: &str = "QDRANT_API_KEY";
pub const ENV_QDRANT_TIMEOUT: &str = "QDRANT_TIMEOUT";
pub const ENV_SCHEMES_COLLECTION: &str = "QDRANT_SCHEMES_COLLECTION";
pub const ENV_MEMORY_COLLECTION: &str = "QDRANT_MEMORY_COLLECTION";
