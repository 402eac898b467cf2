//! Reference example catalog.
//!
//! A curated set of reference figures used as in-context guidance during
//! planning. The catalog is loaded once from a JSON index at startup and
//! shared read-only by all requests. Insertion order is preserved: it is
//! the deterministic tie-break for retrieval ranking.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::DiagramKind;

/// Category tag for a reference example
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Methodology / architecture diagrams
    Methodology,

    /// Statistical plots
    Plot,
}

impl Category {
    /// The category a diagram kind narrows retrieval to
    pub fn for_kind(kind: DiagramKind) -> Self {
        match kind {
            DiagramKind::MethodologyDiagram => Self::Methodology,
            DiagramKind::StatisticalPlot => Self::Plot,
        }
    }
}

/// A single curated reference figure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceExample {
    /// Unique identifier within the catalog
    pub id: String,

    /// Descriptive text (caption plus source excerpt)
    pub description: String,

    /// Category tag
    pub category: Category,

    /// Aspect ratio metadata, e.g. "4:3"
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,

    /// Opaque reference to the example's content (path or URL)
    pub content_ref: String,
}

fn default_aspect_ratio() -> String {
    "4:3".to_string()
}

/// Fixed, pre-loaded set of reference examples
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    examples: Vec<ReferenceExample>,
}

impl ReferenceCatalog {
    /// Build a catalog from examples, preserving their order
    pub fn from_examples(examples: Vec<ReferenceExample>) -> Self {
        Self { examples }
    }

    /// Load the catalog from a JSON index file.
    ///
    /// A missing index yields an empty catalog rather than an error, so
    /// generation can still run without reference guidance.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "no reference index found, catalog is empty");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read reference index: {}", path.display()))?;

        let catalog: Self =
            serde_json::from_str(&content).context("Failed to parse reference index JSON")?;

        info!(count = catalog.len(), "loaded reference catalog");
        Ok(catalog)
    }

    /// All examples in insertion order
    pub fn examples(&self) -> &[ReferenceExample] {
        &self.examples
    }

    /// Look up an example by id
    pub fn get(&self, id: &str) -> Option<&ReferenceExample> {
        self.examples.iter().find(|e| e.id == id)
    }

    /// Examples carrying the given category tag, in insertion order
    pub fn by_category(&self, category: Category) -> Vec<&ReferenceExample> {
        self.examples
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}
