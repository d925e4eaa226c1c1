//! Failure kinds of the pipeline. None of them is retried.

use crate::llm::LlmError;
use crate::tools::RunnerError;

use super::stage::PipelineStage;

/// Longest slice of rejected model output echoed back to callers
const PREVIEW_CHARS: usize = 300;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Prompt must not be empty")]
    InvalidPrompt,

    #[error("Failed to generate script")]
    GenerationFailed(#[source] LlmError),

    #[error("Generated script is invalid: it does not import k6/http")]
    InvalidGeneratedScript { output: String },

    #[error("Invalid k6 script: it must import k6/http")]
    InvalidScript,

    #[error("Failed to execute k6 script")]
    ExecutionFailed(#[source] RunnerError),

    #[error("Failed to parse k6 results")]
    ResultParseFailed(#[source] anyhow::Error),

    #[error("No test results available. Run a test first.")]
    NoResultsAvailable { details: Option<String> },

    #[error("Failed to analyze results")]
    AnalysisFailed(#[source] LlmError),

    #[error("Runtime storage error")]
    Storage(#[source] anyhow::Error),
}

impl PipelineError {
    /// Stable machine-readable name of the failure
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidPrompt => "invalid_prompt",
            PipelineError::GenerationFailed(_) => "generation_failed",
            PipelineError::InvalidGeneratedScript { .. } => "invalid_generated_script",
            PipelineError::InvalidScript => "invalid_script",
            PipelineError::ExecutionFailed(_) => "execution_failed",
            PipelineError::ResultParseFailed(_) => "result_parse_failed",
            PipelineError::NoResultsAvailable { .. } => "no_results_available",
            PipelineError::AnalysisFailed(_) => "analysis_failed",
            PipelineError::Storage(_) => "storage_error",
        }
    }

    /// Diagnostic text from the failing collaborator, if any
    pub fn details(&self) -> Option<String> {
        match self {
            PipelineError::InvalidPrompt | PipelineError::InvalidScript => None,
            PipelineError::GenerationFailed(e) | PipelineError::AnalysisFailed(e) => {
                Some(e.to_string())
            }
            PipelineError::InvalidGeneratedScript { output } => {
                if output.trim().is_empty() {
                    Some("model returned an empty response".to_string())
                } else {
                    Some(preview(output))
                }
            }
            PipelineError::ExecutionFailed(e) => Some(e.diagnostics()),
            PipelineError::ResultParseFailed(e) | PipelineError::Storage(e) => {
                Some(format!("{:#}", e))
            }
            PipelineError::NoResultsAvailable { details } => details.clone(),
        }
    }

    /// Whether the request itself can be fixed by the caller: a script
    /// without the k6/http import, or analysis asked for before any run.
    ///
    /// An empty prompt is not one of these; prompt routes report every
    /// failure as a server error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidScript | PipelineError::NoResultsAvailable { .. }
        )
    }

    /// Stage the failure belongs to
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::InvalidPrompt
            | PipelineError::GenerationFailed(_)
            | PipelineError::InvalidGeneratedScript { .. } => PipelineStage::Generating,
            PipelineError::InvalidScript
            | PipelineError::ExecutionFailed(_)
            | PipelineError::ResultParseFailed(_)
            | PipelineError::Storage(_) => PipelineStage::Executing,
            PipelineError::NoResultsAvailable { .. } | PipelineError::AnalysisFailed(_) => {
                PipelineStage::Analyzing
            }
        }
    }
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
