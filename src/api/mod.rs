//! HTTP service surface over the task scheduler.
//!
//! Thin layer: every route delegates to the scheduler's submit/status/
//! fetch_artifact contract.

pub mod handlers;
pub mod types;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::core::Scheduler;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub scheduler: Arc<Scheduler>,
}

/// Build the axum router with all API routes
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .route("/api/v1/generate", post(handlers::generate))
        .route("/api/v1/tasks/{id}", get(handlers::get_task))
        .route("/api/v1/tasks/{id}/image", get(handlers::get_task_image))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on the given address (blocks until shutdown)
pub async fn serve(addr: &str, state: ApiState) -> anyhow::Result<()> {
    let workers = state.scheduler.worker_count();
    let router = build_router(state);

    info!(workers, "API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::catalog::{ReferenceCatalog, ReferenceExample};
    use crate::domain::{Critique, GenerationRequest};
    use crate::providers::{ExampleScore, Provider, ProviderError};
    use crate::retrieval::Retriever;
    use crate::storage::MemStore;
    use crate::Orchestrator;

    /// Provider that succeeds instantly with canned responses
    struct InstantProvider;

    #[async_trait]
    impl Provider for InstantProvider {
        fn name(&self) -> &str {
            "instant"
        }

        async fn rank_examples(
            &self,
            _request: &GenerationRequest,
            _candidates: &[ReferenceExample],
        ) -> Result<Vec<ExampleScore>, ProviderError> {
            Ok(Vec::new())
        }

        async fn plan(
            &self,
            _request: &GenerationRequest,
            _examples: &[ReferenceExample],
        ) -> Result<String, ProviderError> {
            Ok("plan".to_string())
        }

        async fn style(
            &self,
            _request: &GenerationRequest,
            description: &str,
        ) -> Result<String, ProviderError> {
            Ok(description.to_string())
        }

        async fn render(
            &self,
            _request: &GenerationRequest,
            _description: &str,
        ) -> Result<Vec<u8>, ProviderError> {
            Ok(b"png".to_vec())
        }

        async fn critique(
            &self,
            _request: &GenerationRequest,
            _description: &str,
            _image: &[u8],
        ) -> Result<Critique, ProviderError> {
            Ok(Critique::accept())
        }
    }

    fn test_state() -> ApiState {
        let provider: Arc<dyn Provider> = Arc::new(InstantProvider);
        let store: Arc<dyn crate::storage::ArtifactStore> = Arc::new(MemStore::new());
        let catalog = Arc::new(ReferenceCatalog::default());
        let retriever = Retriever::new(catalog, Arc::clone(&provider), 10);
        let orchestrator = Arc::new(Orchestrator::new(provider, retriever, Arc::clone(&store), 3));
        ApiState {
            scheduler: Scheduler::new(orchestrator, store, 3),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generate_accepts_valid_request() {
        let app = build_router(test_state());
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/generate")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"source_text": "a method", "intent": "show it"}"#,
            ))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_source() {
        let app = build_router(test_state());
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/generate")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"source_text": "", "intent": "show it"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_task_is_404() {
        let app = build_router(test_state());
        let req = Request::builder()
            .uri(format!("/api/v1/tasks/{}", uuid::Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_task_id_is_404() {
        let app = build_router(test_state());
        let req = Request::builder()
            .uri("/api/v1/tasks/not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
