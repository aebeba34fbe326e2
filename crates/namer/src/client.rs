//! The seam between naming logic and whatever answers prompts.

use crate::error::{ErrorKind, Result};
use crate::models::Usage;
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// SiliconFlow's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.siliconflow.cn/v1";
/// Generous, since reasoning models can think for a long time.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A single prompt sent to a single model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: Option<f32>,
}
impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self { model: model.into(), prompt: prompt.into(), temperature: None }
    }
}

/// The model's answer plus what it cost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: String,
    pub usage: Usage,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for any OpenAI-compatible `chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    endpoint: String,
    api_key: String,
}
impl OpenAiClient {
    pub fn new(base_url: impl AsRef<str>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().or_raise(|| ErrorKind::Client)?;
        Ok(Self::with_http_client(base_url, api_key, http))
    }

    /// Uses a pre-configured `reqwest` client (proxies, custom TLS roots).
    pub fn with_http_client(base_url: impl AsRef<str>, api_key: impl Into<String>, http: Client) -> Self {
        let endpoint = format!("{}/chat/completions", base_url.as_ref().trim_end_matches('/'));
        Self { http, endpoint, api_key: api_key.into() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient").field("endpoint", &self.endpoint).finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    #[tracing::instrument(skip_all, fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = ChatRequest {
            model: &request.model,
            messages: [ChatMessage { role: "user", content: &request.prompt }],
            temperature: request.temperature,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .or_raise(|| ErrorKind::Api)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            exn::bail!(ErrorKind::RateLimited);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), detail = %detail.trim(), "Language model request rejected");
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }

        let body: ChatResponse = response
            .json()
            .await
            .or_raise(|| ErrorKind::Parse("response body is not a chat completion".into()))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_raise(|| ErrorKind::Parse("response contained no choices".into()))?;
        let usage = body.usage.unwrap_or_default();
        tracing::debug!(tokens = usage.total(), "Completion received");
        Ok(Completion { content, usage })
    }
}
