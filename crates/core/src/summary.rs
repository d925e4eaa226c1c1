//! # k6 Summary Lookups
//!
//! The summary is kept as an untyped `serde_json::Value`. These helpers pull
//! out the handful of figures the analysis prompts quote, tolerating both
//! `--summary-export` output (fields directly on each metric) and
//! `handleSummary` output (fields under `values`, metrics under `metrics`).

use serde_json::Value;

pub const FAILED_REQUESTS_METRIC: &str = "http_req_failed";
pub const REQUESTS_METRIC: &str = "http_reqs";
pub const DURATION_METRIC: &str = "http_req_duration";
pub const P95_FIELD: &str = "p(95)";

/// Pass/fail conclusion derived from the failed-request rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Failure rate is exactly zero
    Passed,
    /// Failure rate is non-zero
    Failed,
    /// The summary carries no failure rate
    Undetermined,
}

/// Find a metric object by name
pub fn metric<'a>(summary: &'a Value, name: &str) -> Option<&'a Value> {
    summary
        .get("metrics")
        .and_then(|m| m.get(name))
        .or_else(|| summary.get(name))
}

/// Find a field on a metric, looking at the metric itself then under `values`
pub fn metric_field<'a>(summary: &'a Value, name: &str, field: &str) -> Option<&'a Value> {
    let metric = metric(summary, name)?;
    metric
        .get(field)
        .or_else(|| metric.get("values").and_then(|v| v.get(field)))
        .filter(|v| v.is_number())
}

/// Failed-request rate: `value` in export form, `rate` in handleSummary form
pub fn failure_rate(summary: &Value) -> Option<&Value> {
    metric_field(summary, FAILED_REQUESTS_METRIC, "value")
        .or_else(|| metric_field(summary, FAILED_REQUESTS_METRIC, "rate"))
}

/// Requests per second
pub fn request_rate(summary: &Value) -> Option<&Value> {
    metric_field(summary, REQUESTS_METRIC, "rate")
}

/// 95th percentile request duration in milliseconds
pub fn p95_duration(summary: &Value) -> Option<&Value> {
    metric_field(summary, DURATION_METRIC, P95_FIELD)
}

pub fn verdict(summary: &Value) -> Verdict {
    match failure_rate(summary).and_then(Value::as_f64) {
        Some(rate) if rate == 0.0 => Verdict::Passed,
        Some(_) => Verdict::Failed,
        None => Verdict::Undetermined,
    }
}

/// Render a figure the way it appears in the JSON, or `"not reported"`
pub fn display_figure(value: Option<&Value>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "not reported".to_string())
}
