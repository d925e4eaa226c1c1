//! # Runtime State
//!
//! Everything the pipeline keeps on disk: scoped per-run workspaces and the
//! latest published summary.

pub mod io;
pub mod results;

pub use io::{RunWorkspace, RuntimeDir};
pub use results::ResultStore;
