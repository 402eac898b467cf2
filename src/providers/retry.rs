//! Retry with exponential backoff around an inner provider.
//!
//! Transient failures are retried with bounded attempts and capped backoff;
//! permanent failures pass through immediately. Each underlying call also
//! carries an overall deadline, and a timeout counts as a transient failure.
//! Retries never interact with the refinement round budget above this layer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::warn;

use crate::catalog::ReferenceExample;
use crate::domain::{Critique, GenerationRequest};

use super::{ExampleScore, Provider, ProviderError};

/// Backoff policy for transient provider failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first try)
    pub max_attempts: u32,

    /// Initial delay between retries in milliseconds
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,

    /// Backoff multiplier applied after each retry
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Calculate delay for a specific attempt (1-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::from_millis(self.initial_delay_ms);
        }

        let delay =
            self.initial_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);

        let capped = delay.min(self.max_delay_ms as f64) as u64;
        Duration::from_millis(capped)
    }

    /// Check if another attempt fits the budget
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Provider wrapper that retries transient failures
pub struct RetryProvider {
    inner: Arc<dyn Provider>,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn Provider>, policy: RetryPolicy, call_timeout: Duration) -> Self {
        Self {
            inner,
            policy,
            call_timeout,
        }
    }

    async fn call<T, Fut>(
        &self,
        what: &str,
        mut attempt_fn: impl FnMut() -> Fut,
    ) -> Result<T, ProviderError>
    where
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let result = match timeout(self.call_timeout, attempt_fn()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Transient(format!(
                    "{what} call exceeded {}s deadline",
                    self.call_timeout.as_secs()
                ))),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && self.policy.should_retry(attempt) => {
                    let delay = self.policy.delay_for_attempt(attempt);
                    warn!(
                        call = what,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient provider failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(ProviderError::Transient(cause)) => {
                    // Retry budget exhausted: the failure is permanent for this call
                    return Err(ProviderError::Permanent(format!(
                        "{what} failed after {attempt} attempts: {cause}"
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Provider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn rank_examples(
        &self,
        request: &GenerationRequest,
        candidates: &[ReferenceExample],
    ) -> Result<Vec<ExampleScore>, ProviderError> {
        self.call("rank_examples", || {
            self.inner.rank_examples(request, candidates)
        })
        .await
    }

    async fn plan(
        &self,
        request: &GenerationRequest,
        examples: &[ReferenceExample],
    ) -> Result<String, ProviderError> {
        self.call("plan", || self.inner.plan(request, examples))
            .await
    }

    async fn style(
        &self,
        request: &GenerationRequest,
        description: &str,
    ) -> Result<String, ProviderError> {
        self.call("style", || self.inner.style(request, description))
            .await
    }

    async fn render(
        &self,
        request: &GenerationRequest,
        description: &str,
    ) -> Result<Vec<u8>, ProviderError> {
        self.call("render", || self.inner.render(request, description))
            .await
    }

    async fn critique(
        &self,
        request: &GenerationRequest,
        description: &str,
        image: &[u8],
    ) -> Result<Critique, ProviderError> {
        self.call("critique", || {
            self.inner.critique(request, description, image)
        })
        .await
    }
}
