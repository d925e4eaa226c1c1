//! Raw HTTP client for the configured completion API.
//!
//! No pipeline awareness. Just builds the provider request, sends it via
//! reqwest and pulls the text out of the response.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, GeminiRequest, GeminiResponse,
    MessagesRequest, MessagesResponse,
};
use super::TextGenerator;
use crate::models::{ApiFlavor, ModelConfig};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Errors from LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("rate limited or quota exhausted (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("empty response from model")]
    EmptyResponse,

    #[error("missing API key: set {0}")]
    MissingApiKey(String),
}

/// HTTP client for one provider/model pair.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    config: ModelConfig,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    /// Create a client, reading the API key from the provider's environment variables.
    ///
    /// A missing key is not an error here; calls fail with [`LlmError::MissingApiKey`].
    pub fn from_config(config: ModelConfig) -> Self {
        let api_key = config
            .provider
            .api_key_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .filter(|k| !k.trim().is_empty());
        Self::with_api_key(config, api_key)
    }

    /// Create a client with an explicit key (for testing with mock servers).
    pub fn with_api_key(config: ModelConfig, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            config,
            api_key,
            temperature: 0.2,
            max_tokens: 4096,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| LlmError::MissingApiKey(self.config.provider.api_key_vars().join(" or ")))
    }

    async fn complete_gemini(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.effective_base_url(),
            self.config.model
        );
        let request = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key()?)
            .json(&GeminiRequest::user_prompt(prompt, self.temperature));

        let resp: GeminiResponse = send(request).await?;
        match resp.text() {
            Some(text) => Ok(text),
            None => match resp.prompt_feedback {
                Some(feedback) => Err(LlmError::InvalidResponse(format!(
                    "prompt was blocked: {}",
                    feedback
                ))),
                None => Err(LlmError::EmptyResponse),
            },
        }
    }

    async fn complete_anthropic(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.config.effective_base_url());
        let body = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage::user(prompt)],
            temperature: Some(self.temperature),
        };
        let request = self
            .http
            .post(&url)
            .header("x-api-key", self.api_key()?)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let resp: MessagesResponse = send(request).await?;
        resp.text().ok_or(LlmError::EmptyResponse)
    }

    async fn complete_openai(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.config.effective_base_url());
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: Some(self.temperature),
        };
        let request = self
            .http
            .post(&url)
            .bearer_auth(self.api_key()?)
            .json(&body);

        let resp: ChatCompletionResponse = send(request).await?;
        resp.text().ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!(
            provider = self.config.provider.display_name(),
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "Sending completion request"
        );
        match self.config.provider.flavor() {
            ApiFlavor::Gemini => self.complete_gemini(prompt).await,
            ApiFlavor::Anthropic => self.complete_anthropic(prompt).await,
            ApiFlavor::OpenAICompatible => self.complete_openai(prompt).await,
        }
    }
}

// --- Private helpers ---

async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, LlmError> {
    let response = request.send().await?;
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        return Err(LlmError::RateLimited { retry_after });
    }

    if status >= 400 {
        let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
        return Err(LlmError::ApiError {
            status,
            message: body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))
}
