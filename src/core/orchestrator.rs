//! Pipeline orchestrator for a single generation request.
//!
//! Sequences the linear planning phase (retrieval, planning, styling) and
//! then the refinement loop. The run is atomic: a stage failure fails the
//! whole request, and the orchestrator holds no state across requests.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{GenerationRequest, GenerationResult};
use crate::providers::Provider;
use crate::retrieval::Retriever;
use crate::storage::ArtifactStore;

use super::refine::RefineLoop;
use super::{Stage, StageFailure};

pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    retriever: Retriever,
    store: Arc<dyn ArtifactStore>,
    default_max_rounds: u32,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: Retriever,
        store: Arc<dyn ArtifactStore>,
        default_max_rounds: u32,
    ) -> Self {
        Self {
            provider,
            retriever,
            store,
            default_max_rounds,
        }
    }

    /// Run the full pipeline for one request.
    #[instrument(skip(self, request), fields(kind = ?request.kind))]
    pub async fn run(&self, request: &GenerationRequest) -> Result<GenerationResult, StageFailure> {
        request
            .validate()
            .map_err(|e| StageFailure::new(Stage::Validation, e.to_string()))?;

        let run_id = Uuid::new_v4();
        info!(%run_id, "starting generation pipeline");

        // Phase 1: linear planning. Retrieval degrades internally and never
        // aborts the request.
        let examples = self.retriever.select(request).await;
        info!(%run_id, examples = examples.len(), "retrieval complete");

        let description = self
            .provider
            .plan(request, &examples)
            .await
            .map_err(|e| StageFailure::new(Stage::Planning, e.to_string()))?;

        // Styling is a pure text transform; its failure reads as a planning
        // failure to callers.
        let styled = self
            .provider
            .style(request, &description)
            .await
            .map_err(|e| StageFailure::new(Stage::Planning, e.to_string()))?;

        // Phase 2: iterative refinement
        let max_rounds = request.max_rounds.unwrap_or(self.default_max_rounds);
        let refine = RefineLoop::new(
            self.provider.as_ref(),
            self.store.as_ref(),
            request,
            run_id,
            max_rounds,
        );
        let result = refine.run(styled).await?;

        info!(
            %run_id,
            rounds = result.rounds,
            artifact = %result.artifact_key,
            "generation complete"
        );
        Ok(result)
    }
}
