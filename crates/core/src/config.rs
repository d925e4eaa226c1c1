//! # Runtime Configuration
//!
//! Everything Loadsmith reads from the environment, resolved once at startup.

use std::path::PathBuf;
use std::sync::Arc;

use crate::llm::LlmClient;
use crate::models::ModelConfig;
use crate::pipeline::Coordinator;
use crate::state::io::{RUNTIME_DIR_NAME, RUNTIME_PATH_VAR};
use crate::state::RuntimeDir;
use crate::tools::{K6Runner, DEFAULT_K6_BINARY};

pub const K6_BINARY_VAR: &str = "K6_BINARY";

#[derive(Debug, Clone)]
pub struct LoadsmithConfig {
    pub model: ModelConfig,
    pub k6_binary: PathBuf,
    pub runtime_path: PathBuf,
}

impl LoadsmithConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let model = ModelConfig::from_lookup(&lookup)?;
        let k6_binary = get(K6_BINARY_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_K6_BINARY));
        let runtime_path = get(RUNTIME_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(RUNTIME_DIR_NAME));

        Ok(Self {
            model,
            k6_binary,
            runtime_path,
        })
    }

    pub fn runtime(&self) -> RuntimeDir {
        RuntimeDir::new(self.runtime_path.clone())
    }

    /// Coordinator wired to the configured model and k6 binary
    pub fn coordinator(&self) -> Coordinator {
        let client = LlmClient::from_config(self.model.clone());
        if !client.has_api_key() {
            tracing::warn!(
                provider = self.model.provider.display_name(),
                vars = ?self.model.provider.api_key_vars(),
                "No API key configured; generation and analysis will fail"
            );
        }
        Coordinator::new(
            Arc::new(client),
            Arc::new(K6Runner::new(self.k6_binary.clone())),
            self.runtime(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LlmProvider;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LoadsmithConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.model.provider, LlmProvider::Gemini);
        assert_eq!(config.k6_binary, PathBuf::from("k6"));
        assert_eq!(config.runtime_path, PathBuf::from(".loadsmith"));
    }

    #[test]
    fn test_overrides() {
        let config = LoadsmithConfig::from_lookup(lookup(&[
            ("LLM_PROVIDER", "openai"),
            ("K6_BINARY", "/opt/k6/bin/k6"),
            ("LOADSMITH_RUNTIME_PATH", "/tmp/ls"),
            ("LLM_MODEL", " "),
        ]))
        .unwrap();
        assert_eq!(config.model.provider, LlmProvider::OpenAI);
        assert_eq!(config.model.model, "gpt-4o");
        assert_eq!(config.k6_binary, PathBuf::from("/opt/k6/bin/k6"));
        assert_eq!(config.runtime().path(), std::path::Path::new("/tmp/ls"));
    }

    #[test]
    fn test_unknown_provider_is_error() {
        assert!(LoadsmithConfig::from_lookup(lookup(&[("LLM_PROVIDER", "watson")])).is_err());
    }
}
