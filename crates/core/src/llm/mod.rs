//! # LLM Access
//!
//! The generation collaborator behind a single capability: prompt in,
//! text out. Script generation and result analysis both go through
//! [`TextGenerator::generate`] with different templates.

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::{LlmClient, LlmError};

/// Text completion capability used by the pipeline
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `prompt` and return the raw model text
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
