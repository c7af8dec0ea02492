//! # yojana-core
//!
//! Core types, traits, and eligibility logic for yojana.
//!
//! This crate holds everything that makes decisions without touching the
//! network: the signal record and its merge rules, deterministic summaries,
//! the eligibility filter builder, and the traits the pipeline uses to reach
//! the embedding model, the vision model and the vector store.

pub mod credentials;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod models;
pub mod signals;
pub mod traits;

// Re-export commonly used types at crate root
pub use credentials::{is_placeholder, require_credential};
pub use error::{Error, Result};
pub use filter::{build_filter, FieldCondition, FilterSpec, Predicate};
pub use models::*;
pub use signals::{
    fallback_signals, memory_summary, merge_signals, query_text, summarize, vision_hints,
};
pub use traits::*;
