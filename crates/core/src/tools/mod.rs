//! # Execution Tools
//!
//! Wrappers around external executables, returning structured output.
//!
//! ## Modules
//!
//! - `k6` - k6 load-test runner (script in, console output + summary file out)

pub mod k6;

pub use k6::{K6Runner, LoadTester, ProcessOutput, RunnerError, DEFAULT_K6_BINARY};
