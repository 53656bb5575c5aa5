//! Together AI provider, used for OCR and image questions.

use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use studybuddy_core::error::ProviderError;
use studybuddy_core::traits::{
    CompletionRequest, CompletionResponse, ModelInfo, ModelProvider, TokenUsage, VisionProvider,
    VisionRequest,
};

use crate::http::{build_client, empty_reply, post_json, DEFAULT_TIMEOUT_SECS};

pub const TOGETHER_BASE_URL: &str = "https://api.together.xyz";

/// Model served for the `free` vision tier.
pub const FREE_VISION_MODEL: &str = "meta-llama/Llama-Vision-Free";

/// Map a short vision model name onto Together's model id.
///
/// `free` selects the free tier, fully qualified ids (containing `/`) pass
/// through, and anything else becomes `meta-llama/<name>-Instruct-Turbo`.
pub fn resolve_vision_model(name: &str) -> String {
    let name = name.trim();
    if name.eq_ignore_ascii_case("free") {
        FREE_VISION_MODEL.to_string()
    } else if name.contains('/') {
        name.to_string()
    } else {
        format!("meta-llama/{name}-Instruct-Turbo")
    }
}

pub struct TogetherProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl TogetherProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| TOGETHER_BASE_URL.to_string()),
            client: build_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn ensure_key(&self) -> Result<(), ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential("together".into()));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

fn first_content(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(empty_reply)
}

#[async_trait]
impl VisionProvider for TogetherProvider {
    fn name(&self) -> &str {
        "together"
    }

    #[instrument(skip(self, request), fields(model = %request.model, remote = request.image.is_remote()))]
    async fn describe(&self, request: &VisionRequest) -> Result<String> {
        self.ensure_key()?;
        let model = resolve_vision_model(&request.model);
        debug!(%model, "sending vision request");

        let body = ChatRequest {
            model: &model,
            messages: vec![Message {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: request.prompt.clone(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: request.image.to_url(),
                        },
                    },
                ]),
            }],
            max_tokens: None,
            temperature: None,
        };

        let response: ChatResponse = post_json(
            self.client.post(self.endpoint()),
            &self.api_key,
            &body,
            DEFAULT_TIMEOUT_SECS,
        )
        .await?;
        Ok(first_content(response)?)
    }
}

#[async_trait]
impl ModelProvider for TogetherProvider {
    fn name(&self) -> &str {
        "together"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.ensure_key()?;
        let start = Instant::now();

        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                Message {
                    role: "system",
                    content: MessageContent::Text(&request.system_prompt),
                },
                Message {
                    role: "user",
                    content: MessageContent::Text(&request.prompt),
                },
            ],
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
        };

        let response: ChatResponse = post_json(
            self.client.post(self.endpoint()),
            &self.api_key,
            &body,
            DEFAULT_TIMEOUT_SECS,
        )
        .await?;

        let model = if response.model.is_empty() {
            request.model.clone()
        } else {
            response.model.clone()
        };
        let token_usage = response
            .usage
            .as_ref()
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: first_content(response)?,
            model,
            token_usage,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: FREE_VISION_MODEL.into(),
                name: "Llama Vision (free)".into(),
                provider: "together".into(),
                vision: true,
            },
            ModelInfo {
                id: resolve_vision_model("Llama-3.2-11B-Vision"),
                name: "Llama 3.2 11B Vision".into(),
                provider: "together".into(),
                vision: true,
            },
            ModelInfo {
                id: resolve_vision_model("Llama-3.2-90B-Vision"),
                name: "Llama 3.2 90B Vision".into(),
                provider: "together".into(),
                vision: true,
            },
        ]
    }
}
