//! Scheme retrieval and match explanations.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use yojana_core::defaults::SEARCH_LIMIT;
use yojana_core::{
    build_filter, EligibilitySignals, EmbeddingBackend, Error, FilterMatch, MatchedFilters,
    Result, SchemeMatch, SchemePayload, ScoredPoint, SearchRequest, VectorStore,
};

/// Finds schemes for a signal record and explains each hit.
#[derive(Clone)]
pub struct SchemeMatcher {
    embedder: Arc<dyn EmbeddingBackend>,
    store: Arc<dyn VectorStore>,
    collection: String,
    limit: usize,
}

impl SchemeMatcher {
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

    /// Embed `query_text`, search the scheme collection under the signal
    /// filter, and return explanations plus the scheme ids of the hits, both
    /// in store rank order.
    #[instrument(skip(self, signals, query_text), fields(subsystem = "pipeline", component = "matcher", op = "search", collection = %self.collection))]
    pub async fn search(
        &self,
        signals: &EligibilitySignals,
        query_text: &str,
    ) -> Result<(Vec<SchemeMatch>, Vec<String>)> {
        let start = Instant::now();

        let vector = self.embedder.embed_query(query_text).await?;
        let filter = build_filter(signals);
        debug!(filtered = filter.is_some(), "Searching schemes");

        let request = SearchRequest::new(vector, filter, self.limit);
        let points = self.store.search(&self.collection, &request).await?;

        let mut matches = Vec::with_capacity(points.len());
        let mut scheme_ids = Vec::with_capacity(points.len());
        for point in &points {
            let payload = decode_payload(point)?;
            if let Some(id) = payload.scheme_id_string() {
                scheme_ids.push(id);
            }
            matches.push(explain(signals, &payload, point.score));
        }

        debug!(
            result_count = matches.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Scheme search complete"
        );
        Ok((matches, scheme_ids))
    }
}

fn decode_payload(point: &ScoredPoint) -> Result<SchemePayload> {
    match &point.payload {
        None => Ok(SchemePayload::default()),
        Some(map) => serde_json::from_value(JsonValue::Object(map.clone())).map_err(|e| {
            Error::MalformedResponse(format!("Invalid scheme payload on point {}: {}", point.id, e))
        }),
    }
}

/// Explain one hit against the signals that shaped the search.
///
/// Only signals that are known produce an entry. Each entry pairs the signal
/// value with the scheme's own rule, which is `null` when the scheme does not
/// declare one.
pub fn explain_match(signals: &EligibilitySignals, point: &ScoredPoint) -> Result<SchemeMatch> {
    let payload = decode_payload(point)?;
    Ok(explain(signals, &payload, point.score))
}

fn explain(signals: &EligibilitySignals, payload: &SchemePayload, score: Option<f32>) -> SchemeMatch {
    let mut matched = MatchedFilters::default();

    if signals.housing_type.is_known() {
        matched.housing = Some(FilterMatch {
            signal: signals.housing_type,
            rule: payload.rule("housing"),
        });
    }
    if let Some(state) = signals.state.as_ref().filter(|s| !s.is_empty()) {
        matched.state = Some(FilterMatch {
            signal: state.clone(),
            rule: payload.states.clone().unwrap_or(JsonValue::Null),
        });
    }
    if let Some(caste) = signals.caste.as_ref().filter(|c| !c.is_empty()) {
        matched.caste = Some(FilterMatch {
            signal: caste.clone(),
            rule: payload.rule("caste"),
        });
    }
    if let Some(acres) = signals.land_acres {
        matched.land_acres = Some(FilterMatch {
            signal: acres,
            rule: payload.rule("land_max_acres"),
        });
    }

    SchemeMatch {
        scheme_name: payload
            .scheme_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        benefits: payload.benefits.clone().unwrap_or_default(),
        score,
        matched_filters: matched,
        notes: signals.notes.clone(),
    }
}
