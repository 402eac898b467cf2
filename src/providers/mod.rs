//! Provider boundary for external model calls.
//!
//! The pipeline consumes five capabilities behind one trait: reference
//! ranking, plan generation, style refinement, image rendering, and
//! critique. Providers are unreliable; errors are split into transient
//! (retried inside [`retry::RetryProvider`], invisible above the boundary)
//! and permanent (surfaced immediately as a stage failure).

pub mod gemini;
pub mod prompts;
pub mod retry;

pub use gemini::GeminiProvider;
pub use retry::{RetryPolicy, RetryProvider};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::ReferenceExample;
use crate::domain::{Critique, GenerationRequest};

/// Errors a provider call can fail with
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Network trouble, timeout, or rate limit; eligible for retry
    #[error("transient provider error: {0}")]
    Transient(String),

    /// Malformed payload, authentication, quota; never retried
    #[error("provider error: {0}")]
    Permanent(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Relevance score the provider assigns to one catalog candidate
#[derive(Debug, Clone, Deserialize)]
pub struct ExampleScore {
    pub id: String,
    pub score: f64,
}

/// The capability contract the orchestrator calls.
///
/// Calls share no mutable state; any concrete provider plugs in behind
/// this trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name for logging and config
    fn name(&self) -> &str;

    /// Score catalog candidates by relevance to the request
    async fn rank_examples(
        &self,
        request: &GenerationRequest,
        candidates: &[ReferenceExample],
    ) -> Result<Vec<ExampleScore>, ProviderError>;

    /// Produce an initial figure description from the request and examples
    async fn plan(
        &self,
        request: &GenerationRequest,
        examples: &[ReferenceExample],
    ) -> Result<String, ProviderError>;

    /// Refine a description for visual presentation rules (text to text)
    async fn style(
        &self,
        request: &GenerationRequest,
        description: &str,
    ) -> Result<String, ProviderError>;

    /// Render an image from a description
    async fn render(
        &self,
        request: &GenerationRequest,
        description: &str,
    ) -> Result<Vec<u8>, ProviderError>;

    /// Evaluate a rendered image against the request context
    async fn critique(
        &self,
        request: &GenerationRequest,
        description: &str,
        image: &[u8],
    ) -> Result<Critique, ProviderError>;
}
