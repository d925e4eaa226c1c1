//! # Result Store
//!
//! Holds the most recently published k6 summary in a single file,
//! `last_summary.json`, inside the runtime directory. Publishing goes through
//! a temp file and a rename, serialized by a mutex, so a reader sees either
//! the previous document or the new one and never a partial write.
//! Nothing is cached: every load reads the file.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use super::io::RuntimeDir;

pub const LAST_SUMMARY_FILE: &str = "last_summary.json";

#[derive(Debug)]
pub struct ResultStore {
    runtime: RuntimeDir,
    write_lock: Mutex<()>,
}

impl ResultStore {
    pub fn new(runtime: RuntimeDir) -> Self {
        Self {
            runtime,
            write_lock: Mutex::new(()),
        }
    }

    pub fn latest_path(&self) -> PathBuf {
        self.runtime.join(LAST_SUMMARY_FILE)
    }

    /// Replace the latest summary with `raw`, which must be the JSON text k6 wrote
    pub async fn publish_raw(&self, run_id: &str, raw: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.runtime.ensure().await?;

        let target = self.latest_path();
        let staging = self.runtime.join(format!(".{}.{}.tmp", LAST_SUMMARY_FILE, run_id));
        fs::write(&staging, raw)
            .await
            .with_context(|| format!("Failed to stage summary: {:?}", staging))?;
        if let Err(e) = fs::rename(&staging, &target).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e).with_context(|| format!("Failed to publish summary: {:?}", target));
        }
        Ok(())
    }

    /// Raw text of the latest summary, `None` if nothing has been published
    pub async fn load_raw(&self) -> Result<Option<String>> {
        read_optional(&self.latest_path()).await
    }

    /// Parsed latest summary, `None` if nothing has been published
    pub async fn load(&self) -> Result<Option<Value>> {
        match self.load_raw().await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw).with_context(|| {
                    format!("Latest summary is not valid JSON: {:?}", self.latest_path())
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read file: {:?}", path)),
    }
}
