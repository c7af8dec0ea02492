//! OpenAI-compatible embedding and vision backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use yojana_core::defaults::{
    EMBED_DIMENSION, EMBED_MODEL, ENV_OPENAI_API_KEY, ENV_OPENAI_BASE_URL, ENV_OPENAI_EMBED_DIM,
    ENV_OPENAI_EMBED_MODEL, ENV_OPENAI_TIMEOUT, ENV_OPENAI_VISION_MODEL, INFERENCE_TIMEOUT_SECS,
    OPENAI_URL, VISION_MODEL,
};
use yojana_core::error::service_error;
use yojana_core::{
    require_credential, EligibilitySignals, EmbeddingBackend, Error, Result, Vector, VisionBackend,
};

use super::types::*;
use crate::vision::{build_prompt, image_data_url, parse_vision_reply, VisionReply, VisionResponseBody};

/// Calls slower than this are logged as slow.
const SLOW_CALL_MS: u64 = 5000;

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key; required before any request is made.
    pub api_key: Option<String>,
    /// Model to use for embeddings.
    pub embed_model: String,
    /// Multimodal model used for photo analysis.
    pub vision_model: String,
    /// Expected embedding dimension.
    pub embed_dimension: usize,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: OPENAI_URL.to_string(),
            api_key: None,
            embed_model: EMBED_MODEL.to_string(),
            vision_model: VISION_MODEL.to_string(),
            embed_dimension: EMBED_DIMENSION,
            timeout_seconds: INFERENCE_TIMEOUT_SECS,
        }
    }
}

impl OpenAIConfig {
    /// Read configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(ENV_OPENAI_BASE_URL).unwrap_or_else(|_| OPENAI_URL.to_string()),
            api_key: std::env::var(ENV_OPENAI_API_KEY).ok(),
            embed_model: std::env::var(ENV_OPENAI_EMBED_MODEL)
                .unwrap_or_else(|_| EMBED_MODEL.to_string()),
            vision_model: std::env::var(ENV_OPENAI_VISION_MODEL)
                .unwrap_or_else(|_| VISION_MODEL.to_string()),
            embed_dimension: std::env::var(ENV_OPENAI_EMBED_DIM)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(EMBED_DIMENSION),
            timeout_seconds: std::env::var(ENV_OPENAI_TIMEOUT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(INFERENCE_TIMEOUT_SECS),
        }
    }
}

/// OpenAI-compatible backend serving both embeddings and photo analysis.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new backend. Credentials are not checked here; see
    /// [`EmbeddingBackend::ensure_configured`].
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing OpenAI backend: url={}, embed={}, vision={}",
            config.base_url, config.embed_model, config.vision_model
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn check_credentials(&self) -> Result<()> {
        require_credential(ENV_OPENAI_API_KEY, self.config.api_key.as_deref()).map(|_| ())
    }

    /// Build a POST request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.bearer_auth(api_key);
        }

        req.header("Content-Type", "application/json")
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAIBackend {
    #[instrument(skip(self, texts), fields(subsystem = "inference", component = "openai", op = "embed_texts", model = %self.config.embed_model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();

        let request = EmbeddingRequest {
            model: self.config.embed_model.clone(),
            input: texts.to_vec(),
            encoding_format: Some("float".to_string()),
        };

        let response = self.build_request("/embeddings").json(&request).send().await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let result: EmbeddingResponse = response.json().await.map_err(|e| {
            Error::MalformedResponse(format!("Failed to parse embedding response: {}", e))
        })?;

        // Sort by index to ensure correct ordering
        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        let vectors: Vec<Vector> = data.into_iter().map(|d| d.embedding).collect();
        let elapsed = start.elapsed().as_millis() as u64;

        debug!(
            result_count = vectors.len(),
            duration_ms = elapsed,
            "Embedding complete"
        );
        if elapsed > SLOW_CALL_MS {
            warn!(duration_ms = elapsed, slow = true, "Slow embedding operation");
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.embed_dimension
    }

    fn model_name(&self) -> &str {
        &self.config.embed_model
    }

    fn ensure_configured(&self) -> Result<()> {
        self.check_credentials()
    }
}

#[async_trait]
impl VisionBackend for OpenAIBackend {
    #[instrument(skip(self, image_base64, hints_json), fields(subsystem = "inference", component = "openai", op = "extract_signals", model = %self.config.vision_model))]
    async fn extract_signals(
        &self,
        image_base64: &str,
        hints_json: &str,
    ) -> Result<EligibilitySignals> {
        let start = Instant::now();

        let request = ResponsesRequest {
            model: self.config.vision_model.clone(),
            input: vec![InputMessage::user_with_image(
                build_prompt(hints_json),
                image_data_url(image_base64),
            )],
        };

        let response = self.build_request("/responses").json(&request).send().await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let body: VisionResponseBody = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Failed to parse vision response: {}", e)))?;

        let reply = VisionReply::from(body);
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = reply.text().len(),
            duration_ms = elapsed,
            "Vision reply received"
        );
        if elapsed > SLOW_CALL_MS {
            warn!(duration_ms = elapsed, slow = true, "Slow vision operation");
        }

        parse_vision_reply(&reply)
    }

    fn model_name(&self) -> &str {
        &self.config.vision_model
    }

    fn ensure_configured(&self) -> Result<()> {
        self.check_credentials()
    }
}
