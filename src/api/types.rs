//! Request and response bodies for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DiagramKind, GenerationRequest, Task, TaskStatus};

/// Body for `POST /api/v1/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateBody {
    pub source_text: String,
    pub intent: String,
    #[serde(default)]
    pub kind: DiagramKind,
    #[serde(default)]
    pub raw_data: Option<serde_json::Value>,
    #[serde(default)]
    pub max_rounds: Option<u32>,
}

impl From<GenerateBody> for GenerationRequest {
    fn from(body: GenerateBody) -> Self {
        Self {
            source_text: body.source_text,
            intent: body.intent,
            kind: body.kind,
            raw_data: body.raw_data,
            max_rounds: body.max_rounds,
        }
    }
}

/// 202 response for a submitted task
#[derive(Debug, Serialize)]
pub struct TaskCreated {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub status_url: String,
}

/// Result payload inside a completed task view
#[derive(Debug, Serialize)]
pub struct ResultView {
    pub image_url: String,
    pub description: String,
    pub rounds: u32,
    pub iterations: usize,
}

/// Task snapshot for `GET /api/v1/tasks/{id}`.
///
/// Exactly one of `result`/`error` is non-null once the task is terminal;
/// both are null before that.
#[derive(Debug, Serialize)]
pub struct TaskView {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<ResultView>,
    pub error: Option<String>,
}

impl TaskView {
    pub fn from_task(task: &Task) -> Self {
        let result = task.result().map(|r| ResultView {
            image_url: format!("/api/v1/tasks/{}/image", task.id),
            description: r.description.clone(),
            rounds: r.rounds,
            iterations: r.iterations.len(),
        });

        Self {
            task_id: task.id,
            status: task.status,
            created_at: task.created_at,
            completed_at: task.completed_at,
            result,
            error: task.error().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
