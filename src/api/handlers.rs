//! HTTP handlers for the generation service.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::core::SchedulerError;
use crate::domain::GenerationRequest;

use super::types::{ErrorResponse, GenerateBody, TaskCreated, TaskView};
use super::ApiState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn scheduler_error(e: SchedulerError) -> ApiError {
    let status = match e {
        SchedulerError::NotFound(_) => StatusCode::NOT_FOUND,
        SchedulerError::NotReady(_) => StatusCode::CONFLICT,
    };
    api_error(status, e.to_string())
}

/// Unknown or malformed ids both read as "no such task"
fn parse_task_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id)
        .map_err(|_| api_error(StatusCode::NOT_FOUND, format!("task {id} not found")))
}

/// POST /api/v1/generate — submit a generation task (202 Accepted)
pub async fn generate(
    State(state): State<ApiState>,
    Json(body): Json<GenerateBody>,
) -> Result<(StatusCode, Json<TaskCreated>), ApiError> {
    let request: GenerationRequest = body.into();

    let task_id = state
        .scheduler
        .submit(request)
        .await
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TaskCreated {
            task_id,
            status: crate::domain::TaskStatus::Pending,
            status_url: format!("/api/v1/tasks/{task_id}"),
        }),
    ))
}

/// GET /api/v1/tasks/{id} — task snapshot
pub async fn get_task(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<TaskView>, ApiError> {
    let id = parse_task_id(&id)?;
    let task = state.scheduler.status(id).await.map_err(scheduler_error)?;
    Ok(Json(TaskView::from_task(&task)))
}

/// GET /api/v1/tasks/{id}/image — final artifact bytes
pub async fn get_task_image(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_task_id(&id)?;
    let bytes = state
        .scheduler
        .fetch_artifact(id)
        .await
        .map_err(scheduler_error)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

/// GET /health — liveness check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
