//! Refinement history and the terminal output of a successful run.

use serde::{Deserialize, Serialize};

/// Critic verdict on a rendered figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The figure is publication-ready
    Accept,

    /// The figure needs another round with a revised description
    Revise,
}

/// Output of the critique capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Critique {
    /// Overall verdict
    pub verdict: Verdict,

    /// Specific issues found (empty when accepting)
    #[serde(default)]
    pub suggestions: Vec<String>,

    /// Rewritten description to feed the next round, if revising
    #[serde(default)]
    pub revised_description: Option<String>,
}

impl Critique {
    /// A critique that accepts the figure as-is
    pub fn accept() -> Self {
        Self {
            verdict: Verdict::Accept,
            suggestions: Vec::new(),
            revised_description: None,
        }
    }

    /// Build a critique from parsed suggestions; no suggestions means accept
    pub fn from_suggestions(suggestions: Vec<String>, revised_description: Option<String>) -> Self {
        let verdict = if suggestions.is_empty() {
            Verdict::Accept
        } else {
            Verdict::Revise
        };
        Self {
            verdict,
            suggestions,
            revised_description,
        }
    }

    /// Short human-readable summary of the critique
    pub fn summary(&self) -> String {
        if self.suggestions.is_empty() {
            "no issues found".to_string()
        } else {
            self.suggestions[..self.suggestions.len().min(3)].join("; ")
        }
    }
}

/// One render/critique round of the refinement loop.
///
/// Rounds are 1-based and strictly increasing with no gaps within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iteration {
    /// Round number (1-based)
    pub round: u32,

    /// Description that was fed to rendering this round
    pub description: String,

    /// Storage key of the artifact rendered this round
    pub artifact_key: String,

    /// Critic verdict for this round
    pub verdict: Verdict,

    /// Revised description for the next round, if the critic asked for one
    pub revised_description: Option<String>,
}

/// Terminal output of a successful generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Storage key of the final artifact
    pub artifact_key: String,

    /// Final description text
    pub description: String,

    /// Full refinement history, one entry per round
    pub iterations: Vec<Iteration>,

    /// Number of rendering steps actually executed
    pub rounds: u32,
}
