//! Core traits for yojana's external collaborators.
//!
//! The pipeline talks to the embedding model, the vision model and the
//! vector store only through these traits, so each can be swapped for an
//! in-process fake in tests.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::FilterSpec;
use crate::models::{EligibilitySignals, Payload, Vector};

// =============================================================================
// INFERENCE BACKEND TRAITS
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts, one vector per text.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vector> {
        self.embed_texts(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::MalformedResponse("Embedding response contained no vectors".to_string())
            })
    }

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Fail with [`Error::Config`] when credentials are missing.
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }
}

/// Backend that infers eligibility signals from a household photo.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Extract signals from a base64 photo, passing form context as hints.
    async fn extract_signals(
        &self,
        image_base64: &str,
        hints_json: &str,
    ) -> Result<EligibilitySignals>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Fail with [`Error::Config`] when credentials are missing.
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// VECTOR STORE TRAIT
// =============================================================================

/// Point identifier: unsigned integer or UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{}", n),
            Self::Uuid(s) => f.write_str(s),
        }
    }
}

impl From<uuid::Uuid> for PointId {
    fn from(id: uuid::Uuid) -> Self {
        Self::Uuid(id.to_string())
    }
}

/// Similarity search request against one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub vector: Vector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSpec>,
    pub limit: usize,
    pub with_payload: bool,
}

impl SearchRequest {
    pub fn new(vector: Vector, filter: Option<FilterSpec>, limit: usize) -> Self {
        Self {
            vector,
            filter,
            limit,
            with_payload: true,
        }
    }
}

/// Point written to a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub id: PointId,
    pub vector: Vector,
    pub payload: Payload,
}

/// Point returned by a search, in store rank order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredPoint {
    pub id: PointId,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub payload: Option<Payload>,
}

/// Vector store holding scheme and case-memory collections.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Ranked similarity search. Fails with [`Error::MalformedResponse`] when
    /// the response lacks its result list.
    async fn search(&self, collection: &str, request: &SearchRequest) -> Result<Vec<ScoredPoint>>;

    /// Upsert points and wait for the write acknowledgment.
    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<()>;

    /// Overwrite selected payload fields of one point.
    async fn set_payload(&self, collection: &str, id: &PointId, payload: Payload) -> Result<()>;

    /// Fail with [`Error::Config`] when the endpoint or credentials are missing.
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }
}
