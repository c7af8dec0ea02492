//! # yojana-pipeline
//!
//! Scheme matching, case memory, and orchestration for yojana.
//!
//! This crate provides:
//! - [`SchemeMatcher`]: filtered similarity search over the scheme catalogue
//!   with per-match explanations
//! - [`MemoryStore`]: one persisted memory per run, recall of similar cases,
//!   and later feedback updates
//! - [`Orchestrator`]: the end-to-end run returning an [`AnalyzeResult`]
//! - Scheme catalogue ingestion (`yojana-ingest` binary)
//!
//! [`AnalyzeResult`]: yojana_core::AnalyzeResult

pub mod ingest;
pub mod matcher;
pub mod memory;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

pub use ingest::{ingest_schemes, load_seed, IngestReport};
pub use matcher::{explain_match, SchemeMatcher};
pub use memory::MemoryStore;
pub use orchestrator::{Orchestrator, MISSING_PHOTO};
