//! Case memory persistence and recall.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use yojana_core::defaults::SEARCH_LIMIT;
use yojana_core::{
    memory_summary, CaseMemory, EligibilitySignals, EmbeddingBackend, MemoryUpdate, Payload, Point,
    PointId, Result, SearchRequest, VectorStore,
};

/// Stores one memory per run and recalls related prior cases.
#[derive(Clone)]
pub struct MemoryStore {
    embedder: Arc<dyn EmbeddingBackend>,
    store: Arc<dyn VectorStore>,
    collection: String,
    limit: usize,
}

impl MemoryStore {
    pub fn new(
        embedder: Arc<dyn EmbeddingBackend>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
            limit: SEARCH_LIMIT,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Persist a case and return its new identifier.
    #[instrument(skip(self, signals, query_intent, scheme_ids), fields(subsystem = "pipeline", component = "memory", op = "save", collection = %self.collection))]
    pub async fn save(
        &self,
        signals: &EligibilitySignals,
        query_intent: &str,
        scheme_ids: Vec<String>,
    ) -> Result<Uuid> {
        let summary = memory_summary(signals, query_intent);
        let vector = self.embedder.embed_query(&summary).await?;

        let memory = CaseMemory::new(signals.clone(), query_intent, scheme_ids);
        let case_id = Uuid::now_v7();

        self.store
            .upsert(
                &self.collection,
                vec![Point {
                    id: PointId::from(case_id),
                    vector,
                    payload: memory.to_payload()?,
                }],
            )
            .await?;

        info!(case_id = %case_id, "Saved case memory");
        Ok(case_id)
    }

    /// Payloads of the most similar stored cases, in store rank order.
    #[instrument(skip(self, query_text), fields(subsystem = "pipeline", component = "memory", op = "recall", collection = %self.collection))]
    pub async fn recall(&self, query_text: &str) -> Result<Vec<Payload>> {
        let vector = self.embedder.embed_query(query_text).await?;
        let request = SearchRequest::new(vector, None, self.limit);
        let points = self.store.search(&self.collection, &request).await?;

        let memories: Vec<Payload> = points
            .into_iter()
            .map(|p| p.payload.unwrap_or_default())
            .collect();
        debug!(result_count = memories.len(), "Recalled case memories");
        Ok(memories)
    }

    /// Record feedback or a status change on an existing case.
    #[instrument(skip(self, update), fields(subsystem = "pipeline", component = "memory", op = "update", collection = %self.collection, case_id = %case_id))]
    pub async fn update(&self, case_id: Uuid, update: &MemoryUpdate) -> Result<()> {
        update.validate()?;
        self.store.ensure_configured()?;

        let payload = update.to_payload(Utc::now());
        self.store
            .set_payload(&self.collection, &PointId::from(case_id), payload)
            .await?;

        info!("Updated case memory");
        Ok(())
    }
}
