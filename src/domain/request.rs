//! Generation requests and their validation.
//!
//! A request is immutable once created. Validation runs before a request
//! is admitted to the scheduler, so invalid requests never occupy a worker.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of figure to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramKind {
    /// Methodology / architecture diagram
    MethodologyDiagram,

    /// Statistical plot driven by raw data
    StatisticalPlot,
}

impl Default for DiagramKind {
    fn default() -> Self {
        Self::MethodologyDiagram
    }
}

/// Input to the generation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Methodology text or paper excerpt the figure is based on
    pub source_text: String,

    /// Communicative intent (what the figure should convey, e.g. a caption)
    pub intent: String,

    /// Kind of figure to generate
    #[serde(default)]
    pub kind: DiagramKind,

    /// Raw structured data for statistical plots
    #[serde(default)]
    pub raw_data: Option<serde_json::Value>,

    /// Override for the maximum refinement rounds (must be >= 1)
    #[serde(default)]
    pub max_rounds: Option<u32>,
}

/// Errors raised by request validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("source text must not be empty")]
    EmptySourceText,

    #[error("communicative intent must not be empty")]
    EmptyIntent,

    #[error("max rounds must be at least 1")]
    ZeroMaxRounds,
}

impl GenerationRequest {
    /// Check the request for malformed fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source_text.trim().is_empty() {
            return Err(ValidationError::EmptySourceText);
        }
        if self.intent.trim().is_empty() {
            return Err(ValidationError::EmptyIntent);
        }
        if self.max_rounds == Some(0) {
            return Err(ValidationError::ZeroMaxRounds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> GenerationRequest {
        GenerationRequest {
            source_text: "We propose a two-stage encoder.".to_string(),
            intent: "Overview of the architecture".to_string(),
            kind: DiagramKind::MethodologyDiagram,
            raw_data: None,
            max_rounds: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_empty_source_text_rejected() {
        let mut req = valid_request();
        req.source_text = "   ".to_string();
        assert_eq!(req.validate(), Err(ValidationError::EmptySourceText));
    }

    #[test]
    fn test_empty_intent_rejected() {
        let mut req = valid_request();
        req.intent = String::new();
        assert_eq!(req.validate(), Err(ValidationError::EmptyIntent));
    }

    #[test]
    fn test_zero_max_rounds_rejected() {
        let mut req = valid_request();
        req.max_rounds = Some(0);
        assert_eq!(req.validate(), Err(ValidationError::ZeroMaxRounds));
    }

    #[test]
    fn test_positive_max_rounds_accepted() {
        let mut req = valid_request();
        req.max_rounds = Some(1);
        assert!(req.validate().is_ok());
    }
}
