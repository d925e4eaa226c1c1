//! # k6 Runner
//!
//! Runs a script through the k6 CLI and returns its console output.
//! The machine-readable summary is written by k6 itself to the path given
//! with `--summary-export`; reading it back is the caller's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default executable name, resolved through `PATH`
pub const DEFAULT_K6_BINARY: &str = "k6";

/// Captured output of a finished process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn exit_description(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "a signal".to_string(),
        }
    }
}

/// Errors from running the load tester
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("load test exited with {}", .output.exit_description())]
    NonZeroExit { output: ProcessOutput },
}

impl RunnerError {
    /// Diagnostic text for API callers: stderr when present, else the error itself
    pub fn diagnostics(&self) -> String {
        match self {
            RunnerError::Spawn { .. } => self.to_string(),
            RunnerError::NonZeroExit { output } => {
                if output.stderr.trim().is_empty() {
                    output.stdout.clone()
                } else {
                    output.stderr.clone()
                }
            }
        }
    }
}

/// The execution collaborator: script path in, console output out,
/// summary JSON written to `summary_path`.
#[async_trait]
pub trait LoadTester: Send + Sync {
    async fn run(&self, script_path: &Path, summary_path: &Path)
        -> Result<ProcessOutput, RunnerError>;
}

/// [`LoadTester`] backed by the k6 executable
#[derive(Debug, Clone)]
pub struct K6Runner {
    binary: PathBuf,
}

impl Default for K6Runner {
    fn default() -> Self {
        Self::new(DEFAULT_K6_BINARY)
    }
}

impl K6Runner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments passed to `k6`
    pub fn build_args(script_path: &Path, summary_path: &Path) -> Vec<String> {
        vec![
            "run".to_string(),
            "--summary-export".to_string(),
            summary_path.display().to_string(),
            script_path.display().to_string(),
        ]
    }
}

#[async_trait]
impl LoadTester for K6Runner {
    async fn run(
        &self,
        script_path: &Path,
        summary_path: &Path,
    ) -> Result<ProcessOutput, RunnerError> {
        let args = Self::build_args(script_path, summary_path);
        debug!(binary = %self.binary.display(), ?args, "Spawning k6");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let output = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        if !output.success() {
            return Err(RunnerError::NonZeroExit { output });
        }

        // k6 writes progress and log lines to stderr even on success
        if !output.stderr.trim().is_empty() {
            warn!(stderr = %output.stderr.trim(), "k6 wrote to stderr");
        }

        Ok(output)
    }
}
