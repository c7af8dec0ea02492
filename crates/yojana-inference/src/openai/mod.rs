//! OpenAI-compatible inference backend.
//!
//! One backend serves both collaborators the pipeline needs from a model
//! provider: text embeddings (`/embeddings`) and photo signal extraction
//! through the multimodal responses endpoint (`/responses`).
//!
//! # Example
//!
//! ```rust,no_run
//! use yojana_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use yojana_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         api_key: Some("sk-...".to_string()),
//!         ..Default::default()
//!     };
//!     let backend = OpenAIBackend::new(config).unwrap();
//!     let vector = backend.embed_query("housing support").await.unwrap();
//! }
//! ```

mod backend;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig};
pub use types::*;
