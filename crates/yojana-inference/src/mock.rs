//! Mock inference backends for deterministic testing.
//!
//! Embeddings are derived from the input bytes, so equal texts always map to
//! equal vectors. Every call is logged for assertions on call order and count.
//!
//! ## Usage
//!
//! ```rust
//! use yojana_inference::mock::MockEmbeddingBackend;
//! use yojana_core::EmbeddingBackend;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let backend = MockEmbeddingBackend::new().with_dimension(8);
//! let vector = backend.embed_query("housing support").await.unwrap();
//! assert_eq!(vector.len(), 8);
//! assert_eq!(backend.embed_call_count(), 1);
//! # }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use yojana_core::{
    EligibilitySignals, EmbeddingBackend, Error, Result, Vector, VisionBackend,
};

use crate::vision::{parse_vision_reply, VisionReply};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub operation: &'static str,
    pub input: String,
}

type CallLog = Arc<Mutex<Vec<MockCall>>>;

fn record(log: &CallLog, operation: &'static str, input: &str) {
    if let Ok(mut calls) = log.lock() {
        calls.push(MockCall {
            operation,
            input: input.to_string(),
        });
    }
}

fn snapshot(log: &CallLog) -> Vec<MockCall> {
    log.lock().map(|calls| calls.clone()).unwrap_or_default()
}

/// Deterministic embedding backend.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    dimension: usize,
    failure: Option<String>,
    configured: bool,
    calls: CallLog,
}

impl Default for MockEmbeddingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbeddingBackend {
    pub fn new() -> Self {
        Self {
            dimension: 16,
            failure: None,
            configured: true,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Fail every embed call with an external service error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Report missing credentials from `ensure_configured`.
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        snapshot(&self.calls)
    }

    pub fn embed_call_count(&self) -> usize {
        self.calls().len()
    }

    /// Texts embedded so far, in call order.
    pub fn embedded_texts(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.input).collect()
    }

    fn vector_for(&self, text: &str) -> Vector {
        let mut vector = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return vector;
        }
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimension] += f32::from(byte) / 255.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        for text in texts {
            record(&self.calls, "embed", text);
        }
        if let Some(ref message) = self.failure {
            return Err(Error::ExternalService(message.clone()));
        }
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.configured {
            Ok(())
        } else {
            Err(Error::Config("mock embedding backend has no API key".to_string()))
        }
    }
}

/// Vision backend replaying a scripted reply.
#[derive(Clone)]
pub struct MockVisionBackend {
    reply: std::result::Result<VisionReply, String>,
    calls: CallLog,
}

impl MockVisionBackend {
    /// Reply with `text` as a consolidated output.
    pub fn with_reply(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(VisionReply::Consolidated(text.into())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with the given shape.
    pub fn with_shape(reply: VisionReply) -> Self {
        Self {
            reply: Ok(reply),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail with an external service error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        snapshot(&self.calls)
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl VisionBackend for MockVisionBackend {
    async fn extract_signals(
        &self,
        _image_base64: &str,
        hints_json: &str,
    ) -> Result<EligibilitySignals> {
        record(&self.calls, "extract_signals", hints_json);
        match &self.reply {
            Ok(reply) => parse_vision_reply(reply),
            Err(message) => Err(Error::ExternalService(message.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "mock-vision"
    }
}
