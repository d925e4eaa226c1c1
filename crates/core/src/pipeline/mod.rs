//! # Pipeline
//!
//! Generate → execute → analyze, with progress events and typed failures.

pub mod coordinator;
pub mod error;
pub mod events;
pub mod stage;

pub use coordinator::{Coordinator, ExecutionResult, PipelineReport};
pub use error::PipelineError;
pub use events::{PipelineEvent, PipelineEventKind};
pub use stage::PipelineStage;
