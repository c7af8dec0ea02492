//! Qdrant REST client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, instrument, warn};

use yojana_core::defaults::{ENV_QDRANT_API_KEY, ENV_QDRANT_URL};
use yojana_core::error::service_error;
use yojana_core::{
    require_credential, Error, Payload, Point, PointId, Result, Scheme, ScoredPoint,
    SearchRequest, Vector, VectorStore,
};

use crate::config::{Collections, QdrantConfig};
use crate::schema::{CreateCollection, VectorParams, SCHEME_INDEXES};

/// Calls slower than this are logged as slow.
const SLOW_CALL_MS: u64 = 5000;

/// Reply of the collection-exists endpoint.
#[derive(Debug, Deserialize)]
struct ExistsReply {
    result: ExistsResult,
}

#[derive(Debug, Deserialize)]
struct ExistsResult {
    exists: bool,
}

/// Vector store backed by the Qdrant REST API.
pub struct QdrantStore {
    client: Client,
    config: QdrantConfig,
}

impl QdrantStore {
    /// Create a new client. Credentials are checked by
    /// [`VectorStore::ensure_configured`], not here.
    pub fn new(config: QdrantConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            configured = config.url.is_some(),
            timeout_secs = config.timeout_seconds,
            "Initializing Qdrant store"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(QdrantConfig::from_env())
    }

    pub fn config(&self) -> &QdrantConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let base = require_credential(ENV_QDRANT_URL, self.config.url.as_deref())?;
        let url = format!("{}{}", base.trim_end_matches('/'), path);
        let mut req = self.client.request(method, &url);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("api-key", api_key);
        }
        Ok(req)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = req.send().await?;
        if !response.status().is_success() {
            return Err(service_error(response).await);
        }
        Ok(response)
    }

    /// Whether a collection exists.
    #[instrument(skip(self), fields(subsystem = "store", component = "qdrant", op = "collection_exists"))]
    pub async fn collection_exists(&self, collection: &str) -> Result<bool> {
        let req = self.request(Method::GET, &format!("/collections/{}/exists", collection))?;
        let reply: ExistsReply = self.send(req).await?.json().await.map_err(|e| {
            Error::MalformedResponse(format!("Failed to parse collection status: {}", e))
        })?;
        Ok(reply.result.exists)
    }

    /// Create a cosine-distance collection of the given vector size.
    #[instrument(skip(self), fields(subsystem = "store", component = "qdrant", op = "create_collection"))]
    pub async fn create_collection(&self, collection: &str, vector_size: usize) -> Result<()> {
        let body = CreateCollection {
            vectors: VectorParams::cosine(vector_size),
        };
        let req = self
            .request(Method::PUT, &format!("/collections/{}", collection))?
            .json(&body);
        self.send(req).await?;
        info!(collection, vector_size, "Created collection");
        Ok(())
    }

    /// Create any missing collection. A new scheme collection also gets the
    /// payload indexes the eligibility filter relies on. Returns the names of
    /// the collections that were created.
    pub async fn ensure_collections(
        &self,
        collections: &Collections,
        vector_size: usize,
    ) -> Result<Vec<String>> {
        let mut created = Vec::new();

        if !self.collection_exists(&collections.schemes).await? {
            self.create_collection(&collections.schemes, vector_size)
                .await?;
            for index in SCHEME_INDEXES.iter() {
                let req = self
                    .request(
                        Method::PUT,
                        &format!("/collections/{}/index?wait=true", collections.schemes),
                    )?
                    .json(index);
                self.send(req).await?;
                debug!(field = index.field_name, "Created payload index");
            }
            created.push(collections.schemes.clone());
        }

        if !self.collection_exists(&collections.memories).await? {
            self.create_collection(&collections.memories, vector_size)
                .await?;
            created.push(collections.memories.clone());
        }

        Ok(created)
    }

    /// Upsert schemes with their description vectors, one point per scheme.
    pub async fn upsert_schemes(
        &self,
        collection: &str,
        schemes: &[Scheme],
        vectors: Vec<Vector>,
    ) -> Result<usize> {
        if schemes.len() != vectors.len() {
            return Err(Error::MalformedResponse(format!(
                "Got {} vectors for {} schemes",
                vectors.len(),
                schemes.len()
            )));
        }

        let points = schemes
            .iter()
            .zip(vectors)
            .map(|(scheme, vector)| {
                let payload = match serde_json::to_value(scheme)? {
                    JsonValue::Object(map) => map,
                    _ => Payload::new(),
                };
                Ok(Point {
                    id: PointId::from(scheme.point_id()),
                    vector,
                    payload,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let count = points.len();
        self.upsert(collection, points).await?;
        Ok(count)
    }
}

/// Decode the `result` list of a search reply.
fn parse_search_reply(body: JsonValue) -> Result<Vec<ScoredPoint>> {
    let Some(JsonValue::Array(items)) = body.get("result").cloned() else {
        return Err(Error::MalformedResponse(
            "Unexpected Qdrant response format.".to_string(),
        ));
    };
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| {
                Error::MalformedResponse(format!("Failed to decode scored point: {}", e))
            })
        })
        .collect()
}

#[async_trait]
impl VectorStore for QdrantStore {
    #[instrument(skip(self, request), fields(subsystem = "store", component = "qdrant", op = "search", collection = %collection, filtered = request.filter.is_some()))]
    async fn search(&self, collection: &str, request: &SearchRequest) -> Result<Vec<ScoredPoint>> {
        let start = Instant::now();

        let req = self
            .request(
                Method::POST,
                &format!("/collections/{}/points/search", collection),
            )?
            .json(request);
        let body: JsonValue = self.send(req).await?.json().await.map_err(|e| {
            Error::MalformedResponse(format!("Failed to parse search response: {}", e))
        })?;
        let points = parse_search_reply(body)?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            result_count = points.len(),
            duration_ms = elapsed,
            "Search complete"
        );
        if elapsed > SLOW_CALL_MS {
            warn!(duration_ms = elapsed, slow = true, "Slow search operation");
        }
        Ok(points)
    }

    #[instrument(skip(self, points), fields(subsystem = "store", component = "qdrant", op = "upsert", collection = %collection, input_count = points.len()))]
    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<()> {
        let start = Instant::now();

        let req = self
            .request(
                Method::PUT,
                &format!("/collections/{}/points?wait=true", collection),
            )?
            .json(&json!({ "points": points }));
        self.send(req).await?;

        debug!(duration_ms = start.elapsed().as_millis() as u64, "Upsert complete");
        Ok(())
    }

    #[instrument(skip(self, payload), fields(subsystem = "store", component = "qdrant", op = "set_payload", collection = %collection, point = %id))]
    async fn set_payload(&self, collection: &str, id: &PointId, payload: Payload) -> Result<()> {
        let req = self
            .request(
                Method::POST,
                &format!("/collections/{}/points/payload?wait=true", collection),
            )?
            .json(&json!({ "payload": payload, "points": [id] }));
        self.send(req).await?;
        debug!("Payload updated");
        Ok(())
    }

    fn ensure_configured(&self) -> Result<()> {
        require_credential(ENV_QDRANT_URL, self.config.url.as_deref())?;
        require_credential(ENV_QDRANT_API_KEY, self.config.api_key.as_deref())?;
        Ok(())
    }
}
