//! # Pipeline Events
//!
//! Progress notifications emitted by the coordinator and streamed to
//! clients over SSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of pipeline event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineEventKind {
    /// Combined generate-and-run started
    PipelineStarted,
    /// Model returned a valid script
    ScriptGenerated,
    /// k6 process launched
    ExecutionStarted,
    /// k6 finished and the summary was parsed
    ExecutionCompleted,
    /// Model returned an analysis
    AnalysisCompleted,
    /// Combined pipeline finished
    PipelineCompleted,
    /// Any step failed
    PipelineFailed,
}

/// An event in the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Unique event ID
    pub id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: PipelineEventKind,
    /// Run workspace the event belongs to, once one exists
    #[serde(default)]
    pub run_id: Option<String>,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl PipelineEvent {
    /// Create a new event
    pub fn new(kind: PipelineEventKind) -> Self {
        Self {
            id: event_id(),
            timestamp: Utc::now(),
            kind,
            run_id: None,
            data: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Tag the event with a run ID
    pub fn with_run(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }
}

/// Time-ordered id, unique enough for a single process
fn event_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", Utc::now().timestamp_micros(), seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = PipelineEvent::new(PipelineEventKind::ExecutionStarted)
            .with_run("run-abc")
            .with_data(serde_json::json!({"binary": "k6"}));

        assert_eq!(event.run_id, Some("run-abc".to_string()));
        assert_eq!(event.data.unwrap()["binary"], "k6");
    }

    #[test]
    fn test_event_ids_unique() {
        let a = PipelineEvent::new(PipelineEventKind::PipelineStarted);
        let b = PipelineEvent::new(PipelineEventKind::PipelineStarted);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_value(PipelineEvent::new(PipelineEventKind::PipelineFailed)).unwrap();
        assert_eq!(json["kind"], "pipeline_failed");
    }
}
