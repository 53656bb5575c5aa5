//! OpenAI-compatible chat completions provider.
//!
//! Also serves Mistral, whose API accepts the same request shape.

use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use studybuddy_core::error::ProviderError;
use studybuddy_core::traits::{
    CompletionRequest, CompletionResponse, ModelInfo, ModelProvider, TokenUsage,
};

use crate::http::{build_client, empty_reply, post_json, DEFAULT_TIMEOUT_SECS};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai";

/// OpenAI-compatible API provider.
pub struct OpenAiProvider {
    name: String,
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, base_url: Option<String>, org_id: Option<String>) -> Result<Self> {
        Ok(Self {
            name: "openai".to_string(),
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            org_id,
            client: build_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Mistral's chat completions endpoint.
    pub fn mistral(api_key: &str, base_url: Option<String>) -> Result<Self> {
        let mut provider = Self::new(
            api_key,
            Some(base_url.unwrap_or_else(|| MISTRAL_BASE_URL.to_string())),
            None,
        )?;
        provider.name = "mistral".to_string();
        Ok(provider)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: ChatUsage,
    model: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, request), fields(provider = %self.name, model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential(self.name.clone()).into());
        }
        let start = Instant::now();

        let body = ChatRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt.clone(),
                },
            ],
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url));
        if let Some(org) = &self.org_id {
            req = req.header("OpenAI-Organization", org);
        }

        let api_response: ChatResponse =
            post_json(req, &self.api_key, &body, DEFAULT_TIMEOUT_SECS).await?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(empty_reply)?;

        Ok(CompletionResponse {
            content,
            model: api_response.model,
            token_usage: TokenUsage {
                prompt_tokens: api_response.usage.prompt_tokens,
                completion_tokens: api_response.usage.completion_tokens,
                total_tokens: api_response.usage.total_tokens,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        let ids: &[(&str, &str)] = if self.name == "mistral" {
            &[
                ("mistral-large-latest", "Mistral Large"),
                ("mistral-small-latest", "Mistral Small"),
            ]
        } else {
            &[
                ("gpt-4o-mini", "GPT-4o Mini"),
                ("gpt-4o", "GPT-4o"),
                ("gpt-4-1106-preview", "GPT-4 Turbo (1106 preview)"),
            ]
        };
        ids.iter()
            .map(|(id, name)| ModelInfo {
                id: (*id).into(),
                name: (*name).into(),
                provider: self.name.clone(),
                vision: false,
            })
            .collect()
    }
}
