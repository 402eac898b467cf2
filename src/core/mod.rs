//! Orchestration core: the generation pipeline, the refinement loop,
//! and the task scheduler.

pub mod orchestrator;
pub mod refine;
pub mod scheduler;

pub use orchestrator::Orchestrator;
pub use scheduler::{Scheduler, SchedulerError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named pipeline stage, used to tag failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    Retrieval,
    Planning,
    Rendering,
    Critique,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Retrieval => "retrieval",
            Self::Planning => "planning",
            Self::Rendering => "rendering",
            Self::Critique => "critique",
        };
        f.write_str(name)
    }
}

/// Unrecoverable pipeline failure, tagged with the stage that raised it
#[derive(Debug, Clone, Error)]
#[error("{stage} stage failed: {cause}")]
pub struct StageFailure {
    pub stage: Stage,
    pub cause: String,
}

impl StageFailure {
    pub fn new(stage: Stage, cause: impl Into<String>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }
}
