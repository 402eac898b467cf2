//! Data structures shared across the pipeline and scheduler.

pub mod request;
pub mod result;
pub mod task;

pub use request::{DiagramKind, GenerationRequest, ValidationError};
pub use result::{Critique, GenerationResult, Iteration, Verdict};
pub use task::{Task, TaskOutcome, TaskStatus};
