//! # Loadsmith Models
//!
//! Centralized LLM configuration types. Both the script generator and the
//! result analyzer resolve their provider, model and credential from here.

use serde::{Deserialize, Serialize};

/// Supported LLM providers
///
/// Each provider reads its API key from a fixed environment variable:
/// - Gemini (Google) - `GEMINI_API_KEY` (or `GOOGLE_API_KEY`)
/// - Anthropic (Claude) - `ANTHROPIC_API_KEY`
/// - OpenAI (GPT) - `OPENAI_API_KEY`
/// - OpenRouter (Gateway) - `OPENROUTER_API_KEY`
/// - Grok (xAI) - `XAI_API_KEY`
/// - DeepSeek - `DEEPSEEK_API_KEY`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    OpenRouter,
    Grok,
    DeepSeek,
}

/// Wire protocol spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    /// `models/{model}:generateContent`
    Gemini,
    /// `/v1/messages`
    Anthropic,
    /// `/chat/completions`
    OpenAICompatible,
}

impl LlmProvider {
    /// Parse the `LLM_PROVIDER` value. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(LlmProvider::Gemini),
            "anthropic" | "claude" => Some(LlmProvider::Anthropic),
            "openai" => Some(LlmProvider::OpenAI),
            "openrouter" => Some(LlmProvider::OpenRouter),
            "grok" | "xai" => Some(LlmProvider::Grok),
            "deepseek" => Some(LlmProvider::DeepSeek),
            _ => None,
        }
    }

    /// Display name for logs and the health endpoint
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "Gemini",
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::OpenRouter => "OpenRouter",
            LlmProvider::Grok => "Grok",
            LlmProvider::DeepSeek => "DeepSeek",
        }
    }

    /// Model used when `LLM_MODEL` is not set
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-1.5-flash",
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
            LlmProvider::OpenAI => "gpt-4o",
            LlmProvider::OpenRouter => "anthropic/claude-3.5-sonnet",
            LlmProvider::Grok => "grok-2",
            LlmProvider::DeepSeek => "deepseek-chat",
        }
    }

    /// Environment variables checked, in order, for the API key
    pub fn api_key_vars(&self) -> &'static [&'static str] {
        match self {
            LlmProvider::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            LlmProvider::Anthropic => &["ANTHROPIC_API_KEY"],
            LlmProvider::OpenAI => &["OPENAI_API_KEY"],
            LlmProvider::OpenRouter => &["OPENROUTER_API_KEY"],
            LlmProvider::Grok => &["XAI_API_KEY"],
            LlmProvider::DeepSeek => &["DEEPSEEK_API_KEY"],
        }
    }

    /// Base URL used when no override is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
            LlmProvider::Anthropic => "https://api.anthropic.com",
            LlmProvider::OpenAI => "https://api.openai.com/v1",
            LlmProvider::OpenRouter => "https://openrouter.ai/api/v1",
            LlmProvider::Grok => "https://api.x.ai/v1",
            LlmProvider::DeepSeek => "https://api.deepseek.com/v1",
        }
    }

    pub fn flavor(&self) -> ApiFlavor {
        match self {
            LlmProvider::Gemini => ApiFlavor::Gemini,
            LlmProvider::Anthropic => ApiFlavor::Anthropic,
            LlmProvider::OpenAI
            | LlmProvider::OpenRouter
            | LlmProvider::Grok
            | LlmProvider::DeepSeek => ApiFlavor::OpenAICompatible,
        }
    }
}

/// Configuration for LLM model selection
///
/// ## Example
/// ```rust,ignore
/// use loadsmith_core::models::{ModelConfig, LlmProvider};
///
/// // Gemini with its default model
/// let config = ModelConfig::default();
///
/// // Specific provider and model
/// let config = ModelConfig::with_provider(LlmProvider::OpenAI, "gpt-4o");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// LLM provider to use
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name (e.g., "gemini-1.5-flash", "gpt-4o")
    pub model: String,
    /// Optional base URL override (self-hosted gateways, mock servers)
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::with_provider(LlmProvider::Gemini, LlmProvider::Gemini.default_model())
    }
}

impl ModelConfig {
    /// Create config for a specific provider
    pub fn with_provider(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            base_url: None,
        }
    }

    /// Set base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Build from `LLM_PROVIDER`, `LLM_MODEL` (or `GEMINI_MODEL`) and
    /// `LLM_BASE_URL`, as returned by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get("LLM_PROVIDER") {
            Some(name) => LlmProvider::parse(&name).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown LLM_PROVIDER '{}'. Expected one of: gemini, anthropic, openai, openrouter, grok, deepseek",
                    name
                )
            })?,
            None => LlmProvider::default(),
        };

        let model = get("LLM_MODEL")
            .or_else(|| {
                if provider == LlmProvider::Gemini {
                    get("GEMINI_MODEL")
                } else {
                    None
                }
            })
            .unwrap_or_else(|| provider.default_model().to_string());

        Ok(Self {
            provider,
            model,
            base_url: get("LLM_BASE_URL"),
        })
    }

    /// Base URL actually used for requests
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
    }
}
