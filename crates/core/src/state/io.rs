//! # IO Utilities
//!
//! File system layout of the `.loadsmith` runtime directory and the
//! per-run workspaces created inside it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

/// Environment override for the runtime directory
pub const RUNTIME_PATH_VAR: &str = "LOADSMITH_RUNTIME_PATH";

/// Default runtime directory name, relative to the working directory
pub const RUNTIME_DIR_NAME: &str = ".loadsmith";

pub const SCRIPT_FILE: &str = "script.js";
pub const SUMMARY_FILE: &str = "summary.json";

/// Root directory holding run workspaces and the latest result
#[derive(Debug, Clone)]
pub struct RuntimeDir {
    root: PathBuf,
}

impl RuntimeDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Ensure the runtime directory exists
    pub async fn ensure(&self) -> Result<&Path> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create runtime directory: {:?}", self.root))?;
        Ok(&self.root)
    }

    /// Create a fresh workspace for one script execution
    pub async fn workspace(&self) -> Result<RunWorkspace> {
        self.ensure().await?;
        let root = self.root.clone();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix("run-").tempdir_in(&root)
        })
        .await
        .context("Workspace creation task panicked")?
        .with_context(|| format!("Failed to create run workspace in {:?}", self.root))?;
        Ok(RunWorkspace { dir })
    }
}

/// Scoped directory holding one run's script and summary files.
///
/// The directory and everything in it is removed when this value drops,
/// whichever way the run ends.
#[derive(Debug)]
pub struct RunWorkspace {
    dir: TempDir,
}

impl RunWorkspace {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run id derived from the directory name
    pub fn run_id(&self) -> String {
        self.dir
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn script_path(&self) -> PathBuf {
        self.dir.path().join(SCRIPT_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.path().join(SUMMARY_FILE)
    }

    pub async fn write_script(&self, script: &str) -> Result<PathBuf> {
        let path = self.script_path();
        fs::write(&path, script)
            .await
            .with_context(|| format!("Failed to write script: {:?}", path))?;
        Ok(path)
    }

    pub async fn read_summary(&self) -> Result<String> {
        let path = self.summary_path();
        fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read summary: {:?}", path))
    }
}
