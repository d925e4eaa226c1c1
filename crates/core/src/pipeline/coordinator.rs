//! # Pipeline Coordinator
//!
//! Orchestrates generate → execute → analyze. Each step is also exposed on
//! its own so a caller can generate, edit, run and analyze in separate
//! round trips. The only state shared between calls is the latest summary
//! in the [`ResultStore`].
//!
//! A k6 run executes in its own task. Dropping the caller's future (a client
//! disconnecting, say) neither stops k6 nor loses its summary: the run still
//! completes and publishes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::llm::TextGenerator;
use crate::prompts::{self, AnalysisMode};
use crate::script::GeneratedScript;
use crate::state::{ResultStore, RuntimeDir};
use crate::tools::LoadTester;

use super::error::PipelineError;
use super::events::{PipelineEvent, PipelineEventKind};

/// Output of one k6 run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Workspace the run executed in (already removed)
    pub run_id: String,
    /// k6 console output
    pub summary: String,
    /// Parsed `--summary-export` document
    pub results: Value,
}

/// Everything produced by a combined generate-and-run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub script: GeneratedScript,
    pub execution: ExecutionResult,
    pub analysis: String,
}

/// Optional event channel, shared with detached runs
#[derive(Clone, Default)]
struct Events(Option<mpsc::Sender<PipelineEvent>>);

impl Events {
    async fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event).await;
        }
    }

    async fn failure(&self, err: &PipelineError, run_id: Option<&str>) {
        error!(kind = err.kind(), details = ?err.details(), "{}", err);
        let mut event = PipelineEvent::new(PipelineEventKind::PipelineFailed).with_data(json!({
            "stage": err.stage(),
            "error": err.kind(),
            "message": err.to_string(),
        }));
        if let Some(run_id) = run_id {
            event = event.with_run(run_id);
        }
        self.emit(event).await;
    }
}

/// One k6 execution, owned by the task that runs it
struct Execution {
    tester: Arc<dyn LoadTester>,
    runtime: RuntimeDir,
    results: Arc<ResultStore>,
    events: Events,
}

impl Execution {
    async fn run(self, script: GeneratedScript) -> Result<ExecutionResult, PipelineError> {
        // Removed on drop, on every path out of this function
        let workspace = match self.runtime.workspace().await {
            Ok(workspace) => workspace,
            Err(e) => {
                let err = PipelineError::Storage(e);
                self.events.failure(&err, None).await;
                return Err(err);
            }
        };
        let run_id = workspace.run_id();

        let result = async {
            let script_path = workspace
                .write_script(script.as_str())
                .await
                .map_err(PipelineError::Storage)?;

            info!(run_id = %run_id, "Executing k6 script");
            self.events
                .emit(PipelineEvent::new(PipelineEventKind::ExecutionStarted).with_run(&run_id))
                .await;

            let output = self
                .tester
                .run(&script_path, &workspace.summary_path())
                .await
                .map_err(PipelineError::ExecutionFailed)?;

            let raw = workspace
                .read_summary()
                .await
                .map_err(PipelineError::ResultParseFailed)?;
            let results: Value = serde_json::from_str(&raw)
                .map_err(|e| PipelineError::ResultParseFailed(e.into()))?;

            self.results
                .publish_raw(&run_id, &raw)
                .await
                .map_err(PipelineError::Storage)?;

            Ok::<_, PipelineError>(ExecutionResult {
                run_id: run_id.clone(),
                summary: output.stdout,
                results,
            })
        }
        .await;

        match &result {
            Ok(execution) => {
                info!(run_id = %run_id, "k6 run completed");
                self.events
                    .emit(
                        PipelineEvent::new(PipelineEventKind::ExecutionCompleted)
                            .with_run(&execution.run_id),
                    )
                    .await;
            }
            Err(e) => self.events.failure(e, Some(&run_id)).await,
        }
        result
    }
}

/// The pipeline coordinator
pub struct Coordinator {
    generator: Arc<dyn TextGenerator>,
    tester: Arc<dyn LoadTester>,
    runtime: RuntimeDir,
    results: Arc<ResultStore>,
    events: Events,
}

impl Coordinator {
    /// Create a coordinator over the two collaborators and a runtime directory
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        tester: Arc<dyn LoadTester>,
        runtime: RuntimeDir,
    ) -> Self {
        Self {
            generator,
            tester,
            results: Arc::new(ResultStore::new(runtime.clone())),
            runtime,
            events: Events::default(),
        }
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.events = Events(Some(tx));
        self
    }

    /// Ask the model for a k6 script implementing `prompt`.
    ///
    /// Writes nothing to disk. Output lacking the k6/http import is rejected
    /// as is; there is no retry and no repair.
    pub async fn generate_script(&self, prompt: &str) -> Result<GeneratedScript, PipelineError> {
        let result = self.generate_script_inner(prompt).await;
        if let Err(e) = &result {
            self.events.failure(e, None).await;
        }
        result
    }

    async fn generate_script_inner(&self, prompt: &str) -> Result<GeneratedScript, PipelineError> {
        if prompt.trim().is_empty() {
            return Err(PipelineError::InvalidPrompt);
        }
        info!(prompt = %prompt.trim(), "Generating k6 script");

        let text = self
            .generator
            .generate(&prompts::script_prompt(prompt))
            .await
            .map_err(PipelineError::GenerationFailed)?;

        let script = GeneratedScript::parse(text)
            .map_err(|output| PipelineError::InvalidGeneratedScript { output })?;

        info!(chars = script.as_str().len(), "Script generated");
        self.events
            .emit(
                PipelineEvent::new(PipelineEventKind::ScriptGenerated)
                    .with_data(json!({ "chars": script.as_str().len() })),
            )
            .await;
        Ok(script)
    }

    /// Run `script` through k6 and publish its summary as the latest result.
    ///
    /// The script is checked for the k6/http import again here, since it
    /// may have been edited or written by hand.
    pub async fn run_script(&self, script: &str) -> Result<ExecutionResult, PipelineError> {
        let script = match GeneratedScript::parse(script) {
            Ok(script) => script,
            Err(_) => {
                let err = PipelineError::InvalidScript;
                self.events.failure(&err, None).await;
                return Err(err);
            }
        };
        self.execute(script).await
    }

    async fn execute(&self, script: GeneratedScript) -> Result<ExecutionResult, PipelineError> {
        let execution = Execution {
            tester: self.tester.clone(),
            runtime: self.runtime.clone(),
            results: self.results.clone(),
            events: self.events.clone(),
        };

        match tokio::spawn(execution.run(script)).await {
            Ok(result) => result,
            Err(e) => {
                let err = PipelineError::Storage(
                    anyhow::Error::new(e).context("Execution task did not complete"),
                );
                self.events.failure(&err, None).await;
                Err(err)
            }
        }
    }

    /// Ask the model to explain `summary` using the template for `mode`
    pub async fn analyze(&self, summary: &Value, mode: AnalysisMode) -> Result<String, PipelineError> {
        info!(?mode, "Analyzing k6 results");
        let prompt = prompts::analysis_prompt(summary, mode);

        match self.generator.generate(&prompt).await {
            Ok(analysis) => {
                self.events
                    .emit(
                        PipelineEvent::new(PipelineEventKind::AnalysisCompleted)
                            .with_data(json!({ "mode": mode })),
                    )
                    .await;
                Ok(analysis)
            }
            Err(e) => {
                let err = PipelineError::AnalysisFailed(e);
                self.events.failure(&err, None).await;
                Err(err)
            }
        }
    }

    /// Analyze whatever summary was published last, by any caller
    pub async fn analyze_latest(&self, mode: AnalysisMode) -> Result<String, PipelineError> {
        let summary = match self.results.load().await {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                warn!("Analysis requested before any results were published");
                return Err(PipelineError::NoResultsAvailable { details: None });
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Latest results are unreadable");
                return Err(PipelineError::NoResultsAvailable {
                    details: Some(format!("{:#}", e)),
                });
            }
        };
        self.analyze(&summary, mode).await
    }

    /// Generate, run and analyze in one call.
    ///
    /// The analysis uses this run's own summary, not the latest published one,
    /// so concurrent callers cannot see each other's results here.
    pub async fn generate_and_run(
        &self,
        prompt: &str,
        mode: AnalysisMode,
    ) -> Result<PipelineReport, PipelineError> {
        self.events
            .emit(
                PipelineEvent::new(PipelineEventKind::PipelineStarted)
                    .with_data(json!({ "prompt": prompt })),
            )
            .await;

        let script = self.generate_script(prompt).await?;
        let execution = self.execute(script.clone()).await?;
        let analysis = self.analyze(&execution.results, mode).await?;

        info!(run_id = %execution.run_id, "Pipeline completed");
        self.events
            .emit(
                PipelineEvent::new(PipelineEventKind::PipelineCompleted)
                    .with_run(&execution.run_id),
            )
            .await;

        Ok(PipelineReport {
            script,
            execution,
            analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::state::results::LAST_SUMMARY_FILE;
    use crate::tools::{ProcessOutput, RunnerError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const VALID_SCRIPT: &str = "import http from 'k6/http';\nexport default function () { http.get('https://test.k6.io/api'); }\n";

    /// Replays canned responses and records every prompt it receives
    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse))
        }
    }

    /// Writes a fixed summary file, or fails, and counts invocations
    struct FakeK6 {
        summary: Option<String>,
        fail_with: Option<String>,
        delay: Duration,
        calls: AtomicUsize,
        seen_script: Mutex<Option<String>>,
    }

    impl FakeK6 {
        fn writing(summary: &str) -> Arc<Self> {
            Arc::new(Self {
                summary: Some(summary.to_string()),
                fail_with: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                seen_script: Mutex::new(None),
            })
        }

        fn failing(stderr: &str) -> Arc<Self> {
            Arc::new(Self {
                summary: None,
                fail_with: Some(stderr.to_string()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                seen_script: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LoadTester for FakeK6 {
        async fn run(
            &self,
            script_path: &Path,
            summary_path: &Path,
        ) -> Result<ProcessOutput, RunnerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_script.lock().unwrap() = std::fs::read_to_string(script_path).ok();
            tokio::time::sleep(self.delay).await;

            if let Some(stderr) = &self.fail_with {
                return Err(RunnerError::NonZeroExit {
                    output: ProcessOutput {
                        stdout: String::new(),
                        stderr: stderr.clone(),
                        exit_code: Some(107),
                    },
                });
            }
            if let Some(summary) = &self.summary {
                std::fs::write(summary_path, summary).unwrap();
            }
            Ok(ProcessOutput {
                stdout: "     checks.........................: 100.00%".to_string(),
                stderr: "time=\"...\" level=warning msg=\"noisy\"".to_string(),
                exit_code: Some(0),
            })
        }
    }

    fn coordinator(
        dir: &Path,
        generator: Arc<ScriptedGenerator>,
        tester: Arc<FakeK6>,
    ) -> Coordinator {
        Coordinator::new(generator, tester, RuntimeDir::new(dir))
    }

    fn run_dirs(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .filter(|name| name.starts_with("run-"))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_generate_script_returns_valid_script() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::new(vec![Ok(VALID_SCRIPT.to_string())]);
        let tester = FakeK6::writing("{}");
        let coordinator = coordinator(dir.path(), generator.clone(), tester.clone());

        let script = coordinator.generate_script("10 users for 30s").await.unwrap();
        assert_eq!(script.as_str(), VALID_SCRIPT);
        assert!(generator.prompts()[0].contains("10 users for 30s"));
        assert_eq!(tester.calls(), 0);
    }

    #[tokio::test]
    async fn test_generated_text_without_marker_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::new(vec![Ok("Here is your test!".to_string())]);
        let tester = FakeK6::writing("{}");
        let coordinator = coordinator(dir.path(), generator, tester.clone());

        let err = coordinator.generate_and_run("hit /api", AnalysisMode::Quick).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidGeneratedScript { .. }));
        assert_eq!(tester.calls(), 0);
        assert!(run_dirs(dir.path()).is_empty());
        assert!(!dir.path().join(LAST_SUMMARY_FILE).exists());
    }

    #[tokio::test]
    async fn test_empty_prompt_skips_generator() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::new(vec![]);
        let coordinator = coordinator(dir.path(), generator.clone(), FakeK6::writing("{}"));

        let err = coordinator.generate_script("   ").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPrompt));
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::new(vec![Err(LlmError::RateLimited { retry_after: None })]);
        let coordinator = coordinator(dir.path(), generator, FakeK6::writing("{}"));

        let err = coordinator.generate_script("hit /api").await.unwrap_err();
        assert_eq!(err.kind(), "generation_failed");
        assert!(err.details().unwrap().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_run_script_rejects_missing_marker_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let tester = FakeK6::writing("{}");
        let coordinator = coordinator(dir.path(), ScriptedGenerator::new(vec![]), tester.clone());

        let err = coordinator.run_script("console.log('hi')").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidScript));
        assert!(err.is_client_error());
        assert_eq!(tester.calls(), 0);
    }

    #[tokio::test]
    async fn test_run_script_publishes_summary_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{"http_reqs":{"rate":7.5}}"#;
        let tester = FakeK6::writing(raw);
        let coordinator = coordinator(dir.path(), ScriptedGenerator::new(vec![]), tester.clone());

        let execution = coordinator.run_script(VALID_SCRIPT).await.unwrap();
        assert_eq!(execution.results, json!({"http_reqs": {"rate": 7.5}}));
        assert!(execution.summary.contains("checks"));
        assert!(execution.run_id.starts_with("run-"));
        assert_eq!(tester.seen_script.lock().unwrap().as_deref(), Some(VALID_SCRIPT));

        let published = std::fs::read_to_string(dir.path().join(LAST_SUMMARY_FILE)).unwrap();
        assert_eq!(published, raw);
        assert!(run_dirs(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_execution_failure_carries_stderr_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let tester = FakeK6::failing("SyntaxError: Unexpected token");
        let coordinator = coordinator(dir.path(), ScriptedGenerator::new(vec![]), tester);

        let err = coordinator.run_script(VALID_SCRIPT).await.unwrap_err();
        assert_eq!(err.kind(), "execution_failed");
        assert_eq!(err.details().as_deref(), Some("SyntaxError: Unexpected token"));
        assert!(run_dirs(dir.path()).is_empty());
        assert!(!dir.path().join(LAST_SUMMARY_FILE).exists());
    }

    #[tokio::test]
    async fn test_unparseable_summary_is_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(
            dir.path(),
            ScriptedGenerator::new(vec![]),
            FakeK6::writing("{not json"),
        );

        let err = coordinator.run_script(VALID_SCRIPT).await.unwrap_err();
        assert!(matches!(err, PipelineError::ResultParseFailed(_)));
        assert!(!dir.path().join(LAST_SUMMARY_FILE).exists());
    }

    #[tokio::test]
    async fn test_missing_summary_file_is_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tester = Arc::new(FakeK6 {
            summary: None,
            fail_with: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            seen_script: Mutex::new(None),
        });
        let coordinator = coordinator(dir.path(), ScriptedGenerator::new(vec![]), tester);

        let err = coordinator.run_script(VALID_SCRIPT).await.unwrap_err();
        assert_eq!(err.kind(), "result_parse_failed");
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_lose_run() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{"http_reqs":{"rate":12.5}}"#;
        let tester = Arc::new(FakeK6 {
            summary: Some(raw.to_string()),
            fail_with: None,
            delay: Duration::from_millis(300),
            calls: AtomicUsize::new(0),
            seen_script: Mutex::new(None),
        });
        let generator = ScriptedGenerator::new(vec![Ok("steady at 12.5 rps".into())]);
        let coordinator = coordinator(dir.path(), generator.clone(), tester.clone());

        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), coordinator.run_script(VALID_SCRIPT))
                .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(tester.calls(), 1);
        let published = std::fs::read_to_string(dir.path().join(LAST_SUMMARY_FILE)).unwrap();
        assert_eq!(published, raw);
        assert!(run_dirs(dir.path()).is_empty());

        let analysis = coordinator.analyze_latest(AnalysisMode::Quick).await.unwrap();
        assert_eq!(analysis, "steady at 12.5 rps");
        assert!(generator.prompts()[0].contains("12.5"));
    }

    #[tokio::test]
    async fn test_analyze_latest_without_results() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::new(vec![Ok("unused".into())]);
        let coordinator = coordinator(dir.path(), generator.clone(), FakeK6::writing("{}"));

        let err = coordinator.analyze_latest(AnalysisMode::Quick).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoResultsAvailable { details: None }));
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_latest_reads_most_recent_run() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::new(vec![Ok("looks healthy".into())]);
        let coordinator = coordinator(
            dir.path(),
            generator.clone(),
            FakeK6::writing(r#"{"http_reqs":{"rate":99.9}}"#),
        );

        std::fs::write(dir.path().join(LAST_SUMMARY_FILE), r#"{"http_reqs":{"rate":1.0}}"#).unwrap();
        coordinator.run_script(VALID_SCRIPT).await.unwrap();

        let analysis = coordinator.analyze_latest(AnalysisMode::Quick).await.unwrap();
        assert_eq!(analysis, "looks healthy");
        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("99.9"));
        assert!(!prompt.contains("\"rate\": 1.0"));
    }

    #[tokio::test]
    async fn test_analysis_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::new(vec![Err(LlmError::ApiError {
            status: 503,
            message: "overloaded".into(),
        })]);
        let coordinator = coordinator(dir.path(), generator, FakeK6::writing("{}"));

        let err = coordinator
            .analyze(&json!({}), AnalysisMode::Comprehensive)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "analysis_failed");
        assert!(err.details().unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_end_to_end_quick_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let summary = r#"{"http_req_failed":{"value":0},"http_reqs":{"rate":42.1},"http_req_duration":{"p(95)":180}}"#;
        let generator = ScriptedGenerator::new(vec![
            Ok(VALID_SCRIPT.to_string()),
            Ok("The load test PASSED: no HTTP requests failed.".to_string()),
        ]);
        let tester = FakeK6::writing(summary);
        let (tx, mut rx) = mpsc::channel(32);
        let coordinator =
            coordinator(dir.path(), generator.clone(), tester.clone()).with_event_channel(tx);

        let report = coordinator
            .generate_and_run("simulate 10 users hitting /api for 30s", AnalysisMode::Quick)
            .await
            .unwrap();

        assert_eq!(report.script.as_str(), VALID_SCRIPT);
        assert_eq!(report.execution.results["http_reqs"]["rate"], json!(42.1));
        assert!(report.analysis.starts_with("The load test PASSED"));
        assert_eq!(tester.calls(), 1);

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("simulate 10 users hitting /api for 30s"));
        let analysis_prompt = &prompts[1];
        assert!(analysis_prompt.contains("The load test PASSED"));
        assert!(analysis_prompt.contains("42.1"));
        assert!(analysis_prompt.contains("180"));

        drop(coordinator);
        let mut kinds = Vec::new();
        while let Some(event) = rx.recv().await {
            kinds.push(event.kind);
        }
        assert_eq!(
            kinds,
            vec![
                PipelineEventKind::PipelineStarted,
                PipelineEventKind::ScriptGenerated,
                PipelineEventKind::ExecutionStarted,
                PipelineEventKind::ExecutionCompleted,
                PipelineEventKind::AnalysisCompleted,
                PipelineEventKind::PipelineCompleted,
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_emits_event_with_stage() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        let coordinator = coordinator(
            dir.path(),
            ScriptedGenerator::new(vec![]),
            FakeK6::failing("boom"),
        )
        .with_event_channel(tx);

        coordinator.run_script(VALID_SCRIPT).await.unwrap_err();
        drop(coordinator);

        let mut failed = None;
        while let Some(event) = rx.recv().await {
            if event.kind == PipelineEventKind::PipelineFailed {
                failed = Some(event);
            }
        }
        let failed = failed.expect("failure event");
        assert!(failed.run_id.unwrap().starts_with("run-"));
        let data = failed.data.unwrap();
        assert_eq!(data["stage"], "executing");
        assert_eq!(data["error"], "execution_failed");
    }
}
