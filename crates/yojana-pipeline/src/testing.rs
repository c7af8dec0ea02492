//! In-memory vector store for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use yojana_core::{Error, Payload, Point, PointId, Result, ScoredPoint, SearchRequest, VectorStore};

/// One recorded store call.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Search {
        collection: String,
        request: SearchRequest,
    },
    Upsert {
        collection: String,
        points: Vec<Point>,
    },
    SetPayload {
        collection: String,
        id: PointId,
        payload: Payload,
    },
}

/// Store replaying scripted search hits per collection.
#[derive(Default)]
pub struct FakeStore {
    pub hits: Mutex<Vec<(String, Vec<ScoredPoint>)>>,
    pub calls: Mutex<Vec<StoreCall>>,
    pub unconfigured: bool,
}

impl FakeStore {
    pub fn with_hits(collection: &str, hits: Vec<ScoredPoint>) -> Self {
        let store = Self::default();
        store.add_hits(collection, hits);
        store
    }

    pub fn add_hits(&self, collection: &str, hits: Vec<ScoredPoint>) {
        self.hits
            .lock()
            .unwrap()
            .push((collection.to_string(), hits));
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Operation names in call order.
    pub fn operations(&self) -> Vec<&'static str> {
        self.calls()
            .iter()
            .map(|c| match c {
                StoreCall::Search { .. } => "search",
                StoreCall::Upsert { .. } => "upsert",
                StoreCall::SetPayload { .. } => "set_payload",
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for FakeStore {
    async fn search(&self, collection: &str, request: &SearchRequest) -> Result<Vec<ScoredPoint>> {
        self.calls.lock().unwrap().push(StoreCall::Search {
            collection: collection.to_string(),
            request: request.clone(),
        });
        Ok(self
            .hits
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, hits)| hits.clone())
            .unwrap_or_default())
    }

    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<()> {
        self.calls.lock().unwrap().push(StoreCall::Upsert {
            collection: collection.to_string(),
            points,
        });
        Ok(())
    }

    async fn set_payload(&self, collection: &str, id: &PointId, payload: Payload) -> Result<()> {
        self.calls.lock().unwrap().push(StoreCall::SetPayload {
            collection: collection.to_string(),
            id: id.clone(),
            payload,
        });
        Ok(())
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.unconfigured {
            Err(Error::Config("QDRANT_URL is not set".to_string()))
        } else {
            Ok(())
        }
    }
}
