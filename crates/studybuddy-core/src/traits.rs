//! Core trait definitions for model and vision providers.
//!
//! These async traits are implemented by the `studybuddy-providers` crate.
//! The core treats both as opaque single-shot remote calls: no retries, no
//! cancellation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::image::ImageRef;

// ---------------------------------------------------------------------------
// Model provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that produce summaries, quizzes, and exercises.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send one prompt and return the reply text.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;

    /// List models this provider is known to serve.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// A single prompt for a model provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// System prompt.
    pub system_prompt: String,
    /// User prompt.
    pub prompt: String,
    /// Ask the provider to return a JSON object.
    #[serde(default)]
    pub json_mode: bool,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// A reply from a model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The raw reply text.
    pub content: String,
    /// Model that actually produced the reply.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Whether the model accepts image input.
    #[serde(default)]
    pub vision: bool,
}

// ---------------------------------------------------------------------------
// Vision provider trait
// ---------------------------------------------------------------------------

/// Trait for vision backends used for OCR and image questions.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Send an image with a prompt and return the reply text.
    async fn describe(&self, request: &VisionRequest) -> anyhow::Result<String>;
}

/// An image plus the instruction to apply to it.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// Model identifier as the provider expects it.
    pub model: String,
    pub image: ImageRef,
    pub prompt: String,
}
