//! Refinement loop: render, critique, possibly revise.
//!
//! An explicit state machine bounds the loop structurally: `Rendering` and
//! `Critiquing` alternate until the critic accepts (`Accepted`) or the round
//! budget runs out (`Exhausted`). Exhaustion is not an error; the last
//! rendered artifact is returned as a best-effort result. Provider failures
//! surface as stage-tagged errors and discard the accumulated history.
//!
//! Adapter-level retries are invisible here: rounds count only completed
//! render/critique cycles.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{GenerationRequest, GenerationResult, Iteration, Verdict};
use crate::providers::Provider;
use crate::storage::ArtifactStore;

use super::{Stage, StageFailure};

/// States of the refinement loop; failure is the `Err` path out of `run`
enum State {
    Rendering,
    Critiquing { artifact_key: String, image: Vec<u8> },
    Accepted { artifact_key: String },
    Exhausted { artifact_key: String },
}

pub struct RefineLoop<'a> {
    provider: &'a dyn Provider,
    store: &'a dyn ArtifactStore,
    request: &'a GenerationRequest,
    run_id: Uuid,
    max_rounds: u32,
}

impl<'a> RefineLoop<'a> {
    pub fn new(
        provider: &'a dyn Provider,
        store: &'a dyn ArtifactStore,
        request: &'a GenerationRequest,
        run_id: Uuid,
        max_rounds: u32,
    ) -> Self {
        debug_assert!(max_rounds >= 1);
        Self {
            provider,
            store,
            request,
            run_id,
            max_rounds,
        }
    }

    /// Drive the loop to a terminal state starting from the styled description.
    #[instrument(skip(self, description), fields(run_id = %self.run_id, max_rounds = self.max_rounds))]
    pub async fn run(&self, mut description: String) -> Result<GenerationResult, StageFailure> {
        let mut state = State::Rendering;
        let mut round: u32 = 1;
        let mut iterations: Vec<Iteration> = Vec::new();

        loop {
            state = match state {
                State::Rendering => {
                    info!(round, "rendering");
                    let image = self
                        .provider
                        .render(self.request, &description)
                        .await
                        .map_err(|e| StageFailure::new(Stage::Rendering, e.to_string()))?;

                    let artifact_key = format!("{}/round_{round}.png", self.run_id);
                    self.store
                        .put(&artifact_key, &image)
                        .await
                        .map_err(|e| StageFailure::new(Stage::Rendering, e.to_string()))?;

                    State::Critiquing {
                        artifact_key,
                        image,
                    }
                }

                State::Critiquing {
                    artifact_key,
                    image,
                } => {
                    let critique = self
                        .provider
                        .critique(self.request, &description, &image)
                        .await
                        .map_err(|e| StageFailure::new(Stage::Critique, e.to_string()))?;

                    info!(
                        round,
                        verdict = ?critique.verdict,
                        issues = %critique.summary(),
                        "critique complete"
                    );

                    iterations.push(Iteration {
                        round,
                        description: description.clone(),
                        artifact_key: artifact_key.clone(),
                        verdict: critique.verdict,
                        revised_description: critique.revised_description.clone(),
                    });

                    match (critique.verdict, critique.revised_description) {
                        (Verdict::Revise, Some(revised)) if round < self.max_rounds => {
                            description = revised;
                            round += 1;
                            State::Rendering
                        }
                        (Verdict::Revise, Some(_)) => {
                            // Round budget spent: hand back the last render
                            info!(round, "round budget exhausted, returning last artifact");
                            State::Exhausted { artifact_key }
                        }
                        // A revise verdict without a rewrite has nothing
                        // actionable; the loop ends as accepted.
                        _ => State::Accepted { artifact_key },
                    }
                }

                State::Accepted { artifact_key } | State::Exhausted { artifact_key } => {
                    return Ok(GenerationResult {
                        artifact_key,
                        description,
                        iterations,
                        rounds: round,
                    });
                }
            };
        }
    }
}
