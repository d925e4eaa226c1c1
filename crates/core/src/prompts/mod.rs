//! Prompt templates bundled at compile time, and their renderers.
//!
//! All three templates feed the same completion call; only the text differs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::summary::{self, Verdict};

/// Script generator - turns a scenario description into a k6 script
pub const SCRIPT_GENERATOR: &str = include_str!("defaults/script_generator.md");

/// Quick analysis - verdict, throughput and p95 in a few sentences
pub const QUICK_ANALYSIS: &str = include_str!("defaults/quick_analysis.md");

/// Comprehensive analysis - full rubric report
pub const COMPREHENSIVE_ANALYSIS: &str = include_str!("defaults/comprehensive_analysis.md");

/// Which analysis template to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Short-form: pass/fail sentence, throughput, one latency percentile
    #[default]
    Quick,
    /// Long-form rubric
    Comprehensive,
}

/// All default prompts with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("script_generator", SCRIPT_GENERATOR),
        ("quick_analysis", QUICK_ANALYSIS),
        ("comprehensive_analysis", COMPREHENSIVE_ANALYSIS),
    ]
}

/// Embed the user's scenario into the generator template
pub fn script_prompt(user_prompt: &str) -> String {
    SCRIPT_GENERATOR.replace("{{PROMPT}}", user_prompt.trim())
}

/// Build the analysis prompt for `mode`
pub fn analysis_prompt(summary_json: &Value, mode: AnalysisMode) -> String {
    match mode {
        AnalysisMode::Quick => quick_analysis_prompt(summary_json),
        AnalysisMode::Comprehensive => comprehensive_analysis_prompt(summary_json),
    }
}

/// Opening sentence the model is told to use verbatim
pub fn verdict_sentence(summary_json: &Value) -> String {
    match summary::verdict(summary_json) {
        Verdict::Passed => {
            "The load test PASSED: no HTTP requests failed (http_req_failed rate was 0).".to_string()
        }
        Verdict::Failed => format!(
            "The load test FAILED: some HTTP requests failed (http_req_failed rate was {}).",
            summary::display_figure(summary::failure_rate(summary_json))
        ),
        Verdict::Undetermined => "The load test result is UNDETERMINED: the summary does not report an http_req_failed rate.".to_string(),
    }
}

pub fn quick_analysis_prompt(summary_json: &Value) -> String {
    QUICK_ANALYSIS
        .replace("{{VERDICT_SENTENCE}}", &verdict_sentence(summary_json))
        .replace(
            "{{FAILURE_RATE}}",
            &summary::display_figure(summary::failure_rate(summary_json)),
        )
        .replace(
            "{{REQUEST_RATE}}",
            &summary::display_figure(summary::request_rate(summary_json)),
        )
        .replace(
            "{{P95_DURATION}}",
            &summary::display_figure(summary::p95_duration(summary_json)),
        )
        .replace("{{SUMMARY_JSON}}", &pretty(summary_json))
}

pub fn comprehensive_analysis_prompt(summary_json: &Value) -> String {
    COMPREHENSIVE_ANALYSIS.replace("{{SUMMARY_JSON}}", &pretty(summary_json))
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
