//! # yojana-store
//!
//! Qdrant vector store client for yojana.
//!
//! This crate provides:
//! - [`QdrantStore`], a REST client implementing [`yojana_core::VectorStore`]
//! - Collection bootstrap with the payload indexes used by scheme filters
//! - Collection naming shared by the matcher, the memory store and ingestion
//!
//! ## Example
//!
//! ```rust,ignore
//! use yojana_core::{SearchRequest, VectorStore};
//! use yojana_store::{Collections, QdrantStore};
//!
//! let store = QdrantStore::from_env()?;
//! store.ensure_configured()?;
//! let hits = store
//!     .search(&Collections::default().schemes, &SearchRequest::new(vector, None, 3))
//!     .await?;
//! ```

pub mod config;
pub mod qdrant;
pub mod schema;

pub use config::{Collections, QdrantConfig};
pub use qdrant::QdrantStore;
pub use schema::{FieldSchema, PayloadIndex, SCHEME_INDEXES};
