//! Shared test fixtures: a scriptable provider and pipeline wiring.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use figgen::providers::ExampleScore;
use figgen::{
    Critique, DiagramKind, GenerationRequest, Orchestrator, Provider, ProviderError,
    ReferenceCatalog, ReferenceExample, Retriever,
};

/// Provider whose behavior is scripted per capability
pub struct ScriptedProvider {
    /// Critique round at which the critic starts accepting (None = always revise)
    pub accept_on_round: Option<u32>,

    /// Render call that fails permanently (None = never)
    pub fail_render_on_call: Option<u32>,

    /// Fail the style capability permanently
    pub fail_style: bool,

    /// When set, every render waits for one permit before returning
    pub render_gate: Option<Arc<Semaphore>>,

    renders: AtomicU32,
    critiques: AtomicU32,
}

impl ScriptedProvider {
    fn base() -> Self {
        Self {
            accept_on_round: Some(1),
            fail_render_on_call: None,
            fail_style: false,
            render_gate: None,
            renders: AtomicU32::new(0),
            critiques: AtomicU32::new(0),
        }
    }

    /// Accept immediately on the first critique
    pub fn accepting() -> Self {
        Self::base()
    }

    /// Accept starting at the given critique round
    pub fn accepting_on(round: u32) -> Self {
        Self {
            accept_on_round: Some(round),
            ..Self::base()
        }
    }

    /// Never accept; always return a revised description
    pub fn always_revising() -> Self {
        Self {
            accept_on_round: None,
            ..Self::base()
        }
    }

    /// Fail the nth render call permanently
    pub fn failing_render_on(call: u32) -> Self {
        Self {
            fail_render_on_call: Some(call),
            ..Self::base()
        }
    }

    /// Always revise, but fail the nth render call permanently
    pub fn revising_until_render_fails_on(call: u32) -> Self {
        Self {
            accept_on_round: None,
            fail_render_on_call: Some(call),
            ..Self::base()
        }
    }

    /// Fail the style capability permanently
    pub fn failing_style() -> Self {
        Self {
            fail_style: true,
            ..Self::base()
        }
    }

    /// Block every render until the gate hands out a permit
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            render_gate: Some(gate),
            ..Self::base()
        }
    }

    pub fn render_calls(&self) -> u32 {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn critique_calls(&self) -> u32 {
        self.critiques.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
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
        Ok("initial description".to_string())
    }

    async fn style(
        &self,
        _request: &GenerationRequest,
        description: &str,
    ) -> Result<String, ProviderError> {
        if self.fail_style {
            return Err(ProviderError::Permanent("style model offline".to_string()));
        }
        Ok(format!("styled: {description}"))
    }

    async fn render(
        &self,
        _request: &GenerationRequest,
        _description: &str,
    ) -> Result<Vec<u8>, ProviderError> {
        let call = self.renders.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail_render_on_call == Some(call) {
            return Err(ProviderError::Permanent("image model offline".to_string()));
        }

        if let Some(gate) = &self.render_gate {
            gate.acquire().await.expect("render gate closed").forget();
        }

        Ok(format!("png:render-{call}").into_bytes())
    }

    async fn critique(
        &self,
        _request: &GenerationRequest,
        _description: &str,
        _image: &[u8],
    ) -> Result<Critique, ProviderError> {
        let round = self.critiques.fetch_add(1, Ordering::SeqCst) + 1;

        match self.accept_on_round {
            Some(accept_round) if round >= accept_round => Ok(Critique::accept()),
            _ => Ok(Critique::from_suggestions(
                vec!["arrows cross".to_string()],
                Some(format!("revision {round}")),
            )),
        }
    }
}

pub fn request() -> GenerationRequest {
    GenerationRequest {
        source_text: "We propose a two-stage encoder with residual connections.".to_string(),
        intent: "Overview of the training pipeline".to_string(),
        kind: DiagramKind::MethodologyDiagram,
        raw_data: None,
        max_rounds: None,
    }
}

pub fn orchestrator(
    provider: Arc<dyn Provider>,
    store: Arc<dyn figgen::ArtifactStore>,
    default_max_rounds: u32,
) -> Arc<Orchestrator> {
    let catalog = Arc::new(ReferenceCatalog::default());
    let retriever = Retriever::new(catalog, Arc::clone(&provider), 5);
    Arc::new(Orchestrator::new(
        provider,
        retriever,
        store,
        default_max_rounds,
    ))
}
