//! # Pipeline Stages
//!
//! Stages of the generate → execute → analyze pipeline, used to label
//! failures.

use serde::{Deserialize, Serialize};

/// Stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Asking the model for a script
    Generating,
    /// Running the script through k6
    Executing,
    /// Asking the model to explain the summary
    Analyzing,
}
