//! Scheme catalogue ingestion.

use std::path::Path;

use tracing::info;

use yojana_core::{EmbeddingBackend, Error, Result, Scheme};
use yojana_store::{Collections, QdrantStore};

/// Outcome of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub schemes: usize,
    pub vector_size: usize,
    pub created_collections: Vec<String>,
}

/// Read a JSON array of schemes.
pub fn load_seed(path: &Path) -> Result<Vec<Scheme>> {
    let raw = std::fs::read_to_string(path)?;
    let schemes: Vec<Scheme> = serde_json::from_str(&raw)?;
    Ok(schemes)
}

/// Embed every scheme description in one batch, create missing collections
/// sized to the returned vectors, and upsert the schemes.
pub async fn ingest_schemes(
    embedder: &dyn EmbeddingBackend,
    store: &QdrantStore,
    collections: &Collections,
    schemes: &[Scheme],
) -> Result<IngestReport> {
    if schemes.is_empty() {
        return Err(Error::Validation("Seed file contains no schemes".to_string()));
    }
    embedder.ensure_configured()?;
    yojana_core::VectorStore::ensure_configured(store)?;

    let descriptions: Vec<String> = schemes.iter().map(|s| s.description.clone()).collect();
    let vectors = embedder.embed_texts(&descriptions).await?;
    let vector_size = vectors.first().map(Vec::len).ok_or_else(|| {
        Error::MalformedResponse("Embedding response contained no vectors".to_string())
    })?;

    let created_collections = store.ensure_collections(collections, vector_size).await?;
    let count = store
        .upsert_schemes(&collections.schemes, schemes, vectors)
        .await?;

    info!(
        schemes = count,
        vector_size,
        created = created_collections.len(),
        "Ingested schemes"
    );
    Ok(IngestReport {
        schemes: count,
        vector_size,
        created_collections,
    })
}
