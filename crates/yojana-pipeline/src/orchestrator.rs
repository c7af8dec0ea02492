//! End-to-end eligibility run.
//!
//! One run is a fixed sequence of awaited calls: optional photo analysis,
//! signal merge, scheme search, memory save, memory recall. The first
//! failure ends the run and is returned unchanged.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument};

use yojana_core::{
    fallback_signals, merge_signals, query_text, vision_hints, AnalyzeInput, AnalyzeResult,
    EmbeddingBackend, Error, Result, VectorStore, VisionBackend,
};
use yojana_inference::OpenAIBackend;
use yojana_store::{Collections, QdrantStore};

use crate::matcher::SchemeMatcher;
use crate::memory::MemoryStore;

/// Message returned when vision is requested without a photo.
pub const MISSING_PHOTO: &str = "Select a photo or disable vision.";

/// Sequences vision, matching and memory for one applicant.
#[derive(Clone)]
pub struct Orchestrator {
    embedder: Arc<dyn EmbeddingBackend>,
    vision: Arc<dyn VisionBackend>,
    store: Arc<dyn VectorStore>,
    matcher: SchemeMatcher,
    memory: MemoryStore,
}

impl Orchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingBackend>,
        vision: Arc<dyn VisionBackend>,
        store: Arc<dyn VectorStore>,
        collections: &Collections,
    ) -> Self {
        let matcher = SchemeMatcher::new(embedder.clone(), store.clone(), &collections.schemes);
        let memory = MemoryStore::new(embedder.clone(), store.clone(), &collections.memories);
        Self {
            embedder,
            vision,
            store,
            matcher,
            memory,
        }
    }

    /// Build from environment variables: one OpenAI-compatible backend for
    /// both embeddings and vision, and a Qdrant store.
    pub fn from_env() -> Result<Self> {
        let openai = Arc::new(OpenAIBackend::from_env()?);
        let store = Arc::new(QdrantStore::from_env()?);
        Ok(Self::new(
            openai.clone(),
            openai,
            store,
            &Collections::from_env(),
        ))
    }

    pub fn matcher(&self) -> &SchemeMatcher {
        &self.matcher
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Fail with [`Error::Config`] unless every collaborator has credentials.
    pub fn ensure_configured(&self) -> Result<()> {
        self.embedder.ensure_configured()?;
        self.vision.ensure_configured()?;
        self.store.ensure_configured()
    }

    /// Run the full pipeline for one applicant.
    #[instrument(skip(self, input), fields(subsystem = "pipeline", component = "orchestrator", op = "run", use_vision = input.use_vision))]
    pub async fn run(&self, input: &AnalyzeInput) -> Result<AnalyzeResult> {
        let start = Instant::now();

        self.ensure_configured()?;

        let base = if input.use_vision {
            let photo = input
                .image_base64
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| Error::Validation(MISSING_PHOTO.to_string()))?;
            self.vision
                .extract_signals(photo, &vision_hints(input))
                .await?
        } else {
            fallback_signals()
        };

        let signals = merge_signals(input, base);
        let query_intent = input.intent.as_deref().map(str::trim).unwrap_or_default();
        let query = query_text(Some(query_intent), &signals);
        debug!(query = %query, from_intent = !query_intent.is_empty(), "Query text chosen");

        let (explanations, scheme_ids) = self.matcher.search(&signals, &query).await?;
        let memory_id = self
            .memory
            .save(&signals, query_intent, scheme_ids)
            .await?;
        let memories = self.memory.recall(&query).await?;

        info!(
            memory_id = %memory_id,
            result_count = explanations.len(),
            recalled = memories.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Eligibility run complete"
        );

        Ok(AnalyzeResult {
            signals,
            explanations,
            memories,
            memory_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStore, StoreCall};
    use serde_json::json;
    use yojana_core::defaults::FALLBACK_NOTE;
    use yojana_core::{HousingType, PointId, ScoredPoint};
    use yojana_inference::mock::{MockEmbeddingBackend, MockVisionBackend};
    use yojana_inference::VisionReply;

    struct Harness {
        embedder: Arc<MockEmbeddingBackend>,
        vision: Arc<MockVisionBackend>,
        store: Arc<FakeStore>,
        orchestrator: Orchestrator,
    }

    fn harness(embedder: MockEmbeddingBackend, vision: MockVisionBackend, store: FakeStore) -> Harness {
        let embedder = Arc::new(embedder);
        let vision = Arc::new(vision);
        let store = Arc::new(store);
        let orchestrator = Orchestrator::new(
            embedder.clone(),
            vision.clone(),
            store.clone(),
            &Collections::default(),
        );
        Harness {
            embedder,
            vision,
            store,
            orchestrator,
        }
    }

    fn scheme_hit() -> ScoredPoint {
        ScoredPoint {
            id: PointId::Num(1),
            score: Some(0.9),
            payload: json!({
                "scheme_id": "pmay-g",
                "scheme_name": "PMAY-G",
                "benefits": "Housing grant",
                "states": ["All"],
                "eligibility_rules": {"housing": "kutcha"}
            })
            .as_object()
            .cloned(),
        }
    }

    #[tokio::test]
    async fn test_form_only_run_uses_fixed_call_order() {
        let h = harness(
            MockEmbeddingBackend::new(),
            MockVisionBackend::with_reply("{}"),
            FakeStore::with_hits("gov_schemes", vec![scheme_hit()]),
        );
        let input = AnalyzeInput {
            state: Some("Rajasthan".to_string()),
            intent: Some("housing support".to_string()),
            ..Default::default()
        };

        let result = h.orchestrator.run(&input).await.unwrap();

        assert_eq!(h.vision.call_count(), 0);
        assert_eq!(h.store.operations(), vec!["search", "upsert", "search"]);
        assert_eq!(
            h.embedder.embedded_texts(),
            vec![
                "housing support".to_string(),
                "intent=housing support | housing=unknown | state=Rajasthan | intent=housing support | notes=Fallback signals (no vision API).".to_string(),
                "housing support".to_string(),
            ]
        );
        assert_eq!(result.signals.notes.as_deref(), Some(FALLBACK_NOTE));
        assert_eq!(result.explanations.len(), 1);
        assert_eq!(result.explanations[0].scheme_name, "PMAY-G");

        let calls = h.store.calls();
        let StoreCall::Upsert { points, .. } = &calls[1] else {
            panic!("expected upsert");
        };
        assert_eq!(points[0].id, PointId::from(result.memory_id));
        assert_eq!(points[0].payload["retrieved_scheme_ids"], json!(["pmay-g"]));
    }

    #[tokio::test]
    async fn test_summary_is_query_without_intent() {
        let h = harness(
            MockEmbeddingBackend::new(),
            MockVisionBackend::with_reply("{}"),
            FakeStore::default(),
        );
        let input = AnalyzeInput {
            housing_type: HousingType::Pucca,
            ..Default::default()
        };

        h.orchestrator.run(&input).await.unwrap();

        let texts = h.embedder.embedded_texts();
        let summary = "housing=pucca | notes=Fallback signals (no vision API).";
        assert_eq!(texts[0], summary);
        assert_eq!(texts[1], format!("intent= | {}", summary));
        assert_eq!(texts[2], summary);

        let calls = h.store.calls();
        let StoreCall::Upsert { points, .. } = &calls[1] else {
            panic!("expected upsert");
        };
        assert_eq!(points[0].payload["query_intent"], json!(""));
    }

    #[tokio::test]
    async fn test_vision_signals_merge_under_form() {
        let h = harness(
            MockEmbeddingBackend::new(),
            MockVisionBackend::with_reply(
                r#"{"housing_type": "kutcha", "assets": ["goat"], "demographics": [], "notes": "thatched roof"}"#,
            ),
            FakeStore::default(),
        );
        let input = AnalyzeInput {
            state: Some("Bihar".to_string()),
            land_acres: Some(0.5),
            use_vision: true,
            image_base64: Some("AAAA".to_string()),
            ..Default::default()
        };

        let result = h.orchestrator.run(&input).await.unwrap();

        assert_eq!(result.signals.housing_type, HousingType::Kutcha);
        assert_eq!(result.signals.notes.as_deref(), Some("thatched roof"));
        assert!(result.signals.assets.is_empty());
        assert_eq!(result.signals.state.as_deref(), Some("Bihar"));

        let hints: serde_json::Value =
            serde_json::from_str(&h.vision.calls()[0].input).unwrap();
        assert_eq!(
            hints,
            json!({"state": "Bihar", "caste": null, "land_acres": 0.5})
        );
    }

    #[tokio::test]
    async fn test_intent_is_trimmed_once_for_query_and_memory() {
        let h = harness(
            MockEmbeddingBackend::new(),
            MockVisionBackend::with_reply("{}"),
            FakeStore::default(),
        );
        let input = AnalyzeInput {
            intent: Some("  widow pension ".to_string()),
            ..Default::default()
        };

        h.orchestrator.run(&input).await.unwrap();

        assert_eq!(h.embedder.embedded_texts()[0], "widow pension");
        let calls = h.store.calls();
        let StoreCall::Upsert { points, .. } = &calls[1] else {
            panic!("expected upsert");
        };
        assert_eq!(points[0].payload["query_intent"], json!("widow pension"));
    }

    #[tokio::test]
    async fn test_segmented_vision_reply_is_joined() {
        let h = harness(
            MockEmbeddingBackend::new(),
            MockVisionBackend::with_shape(VisionReply::Segmented(vec![
                "```json\n{\"housing_type\": \"pucca\",".to_string(),
                " \"land_acres\": -3, \"notes\": \"brick walls\"}\n```".to_string(),
            ])),
            FakeStore::default(),
        );
        let input = AnalyzeInput {
            use_vision: true,
            image_base64: Some("AAAA".to_string()),
            ..Default::default()
        };

        let result = h.orchestrator.run(&input).await.unwrap();

        assert_eq!(h.vision.call_count(), 1);
        assert_eq!(result.signals.housing_type, HousingType::Pucca);
        assert_eq!(result.signals.notes.as_deref(), Some("brick walls"));
        assert!(result.signals.land_acres.is_none());
    }

    #[tokio::test]
    async fn test_vision_without_photo_is_rejected_before_any_call() {
        let h = harness(
            MockEmbeddingBackend::new(),
            MockVisionBackend::with_reply("{}"),
            FakeStore::default(),
        );
        let input = AnalyzeInput {
            use_vision: true,
            image_base64: Some("   ".to_string()),
            ..Default::default()
        };

        let err = h.orchestrator.run(&input).await.unwrap_err();

        assert_eq!(err.to_string(), format!("Validation error: {}", MISSING_PHOTO));
        assert_eq!(h.vision.call_count(), 0);
        assert_eq!(h.embedder.embed_call_count(), 0);
        assert!(h.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_store_fails_before_any_call() {
        let h = harness(
            MockEmbeddingBackend::new(),
            MockVisionBackend::with_reply("{}"),
            FakeStore {
                unconfigured: true,
                ..Default::default()
            },
        );

        let err = h
            .orchestrator
            .run(&AnalyzeInput::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "configuration_error");
        assert_eq!(h.embedder.embed_call_count(), 0);
        assert!(h.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_embedder_wins_over_missing_photo() {
        let h = harness(
            MockEmbeddingBackend::new().unconfigured(),
            MockVisionBackend::with_reply("{}"),
            FakeStore::default(),
        );
        let input = AnalyzeInput {
            use_vision: true,
            ..Default::default()
        };

        let err = h.orchestrator.run(&input).await.unwrap_err();
        assert_eq!(err.kind(), "configuration_error");
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_run() {
        let h = harness(
            MockEmbeddingBackend::new().with_failure("quota exceeded"),
            MockVisionBackend::with_reply("{}"),
            FakeStore::default(),
        );

        let err = h
            .orchestrator
            .run(&AnalyzeInput::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "External service error: quota exceeded");
        assert!(h.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_vision_failure_propagates_unchanged() {
        let h = harness(
            MockEmbeddingBackend::new(),
            MockVisionBackend::failing("model overloaded"),
            FakeStore::default(),
        );
        let input = AnalyzeInput {
            use_vision: true,
            image_base64: Some("AAAA".to_string()),
            ..Default::default()
        };

        let err = h.orchestrator.run(&input).await.unwrap_err();
        assert_eq!(err.to_string(), "External service error: model overloaded");
        assert_eq!(h.embedder.embed_call_count(), 0);
    }
}
