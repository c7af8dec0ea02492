//! # yojana-inference
//!
//! Model backends for yojana.
//!
//! This crate provides:
//! - OpenAI-compatible embedding and vision backend (feature `openai`, default)
//! - Vision prompt construction and tolerant reply parsing
//! - Deterministic mock backends for tests (feature `mock`)

pub mod vision;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};

pub use vision::{
    build_prompt, clean_json_text, parse_vision_reply, strip_data_url, VisionReply,
    VisionResponseBody, VISION_PROMPT,
};
