//! # Loadsmith Core
//!
//! Turns a plain-language load-test description into a k6 script, runs it,
//! and has a model explain the numbers.
//!
//! ## Architecture
//!
//! - `llm/` - Text completion client for the configured provider
//! - `models` - Provider and model selection
//! - `prompts/` - Generator and analysis templates
//! - `script` - The k6/http import guard
//! - `summary` - Metric lookups over the k6 summary JSON
//! - `tools/` - The k6 subprocess runner
//! - `state/` - Runtime directory, per-run workspaces, latest result
//! - `pipeline/` - Coordinator, stages, events and errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use loadsmith_core::config::LoadsmithConfig;
//! use loadsmith_core::prompts::AnalysisMode;
//!
//! let coordinator = LoadsmithConfig::from_env()?.coordinator();
//! let report = coordinator
//!     .generate_and_run("10 users hitting /api for 30s", AnalysisMode::Quick)
//!     .await?;
//! println!("{}", report.analysis);
//! ```

pub mod config;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod script;
pub mod state;
pub mod summary;
pub mod tools;
