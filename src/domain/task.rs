//! Task bookkeeping for the scheduler.
//!
//! A Task tracks one generation request from submission to its terminal
//! outcome. Status moves monotonically forward (pending -> running ->
//! completed | failed) and the terminal outcome is write-once: after the
//! first terminal transition no further mutation occurs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::request::GenerationRequest;
use super::result::GenerationResult;

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Queued, waiting for a worker slot
    Pending,

    /// A worker is executing the pipeline
    Running,

    /// Pipeline finished successfully
    Completed,

    /// Pipeline failed
    Failed,
}

impl TaskStatus {
    /// Whether no further transition exists out of this state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Terminal outcome of a task; exactly one variant is set once terminal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    Result(GenerationResult),
    Error(String),
}

/// One generation request's lifecycle, as tracked by the scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier assigned at submission
    pub id: Uuid,

    /// Current lifecycle state
    pub status: TaskStatus,

    /// When the task was submitted
    pub created_at: DateTime<Utc>,

    /// When the task reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,

    /// The owning request (immutable)
    pub request: GenerationRequest,

    /// Result or error, set exactly once on the terminal transition
    pub outcome: Option<TaskOutcome>,
}

impl Task {
    /// Create a new pending task for a request
    pub fn new(id: Uuid, request: GenerationRequest) -> Self {
        Self {
            id,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            request,
            outcome: None,
        }
    }

    /// Mark the task as picked up by a worker
    pub fn start(&mut self) {
        debug_assert_eq!(self.status, TaskStatus::Pending);
        if self.status == TaskStatus::Pending {
            self.status = TaskStatus::Running;
        }
    }

    /// Record a successful result; no-op if already terminal
    pub fn complete(&mut self, result: GenerationResult) {
        debug_assert!(!self.status.is_terminal());
        if self.status.is_terminal() {
            return;
        }
        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.outcome = Some(TaskOutcome::Result(result));
    }

    /// Record a failure; no-op if already terminal
    pub fn fail(&mut self, error: impl Into<String>) {
        debug_assert!(!self.status.is_terminal());
        if self.status.is_terminal() {
            return;
        }
        self.status = TaskStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.outcome = Some(TaskOutcome::Error(error.into()));
    }

    /// The result, if the task completed successfully
    pub fn result(&self) -> Option<&GenerationResult> {
        match &self.outcome {
            Some(TaskOutcome::Result(result)) => Some(result),
            _ => None,
        }
    }

    /// The error description, if the task failed
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(TaskOutcome::Error(error)) => Some(error.as_str()),
            _ => None,
        }
    }
}
