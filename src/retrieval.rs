//! Retrieval index over the reference catalog.
//!
//! Ranks candidates with the provider's relevance signal, breaking equal
//! scores by catalog insertion order so repeated calls return identical
//! orderings. Retrieval never fails a generation: when the relevance signal
//! is unavailable it degrades to catalog order.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{Category, ReferenceCatalog, ReferenceExample};
use crate::domain::GenerationRequest;
use crate::providers::Provider;

pub struct Retriever {
    catalog: Arc<ReferenceCatalog>,
    provider: Arc<dyn Provider>,
    k: usize,
}

impl Retriever {
    pub fn new(catalog: Arc<ReferenceCatalog>, provider: Arc<dyn Provider>, k: usize) -> Self {
        Self {
            catalog,
            provider,
            k,
        }
    }

    /// Select the top examples for a request, most relevant first.
    ///
    /// The request's diagram kind narrows the pool to its category, backfilled
    /// with globally top-ranked items when the narrowed pool is smaller than K.
    /// Returns exactly `min(K, pool size)` items.
    pub async fn select(&self, request: &GenerationRequest) -> Vec<ReferenceExample> {
        let all = self.catalog.examples();
        if all.is_empty() {
            warn!("reference catalog is empty, planning without examples");
            return Vec::new();
        }

        let scores: HashMap<String, f64> = match self.provider.rank_examples(request, all).await {
            Ok(scores) => scores.into_iter().map(|s| (s.id, s.score)).collect(),
            Err(e) => {
                warn!(error = %e, "relevance signal unavailable, falling back to catalog order");
                HashMap::new()
            }
        };
        let score_of = |example: &ReferenceExample| scores.get(&example.id).copied().unwrap_or(0.0);

        // Global ranking: stable sort keeps insertion order for equal scores
        let mut global: Vec<usize> = (0..all.len()).collect();
        global.sort_by(|&a, &b| {
            score_of(&all[b])
                .partial_cmp(&score_of(&all[a]))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let category = Category::for_kind(request.kind);
        let mut pool: Vec<usize> = global
            .iter()
            .copied()
            .filter(|&i| all[i].category == category)
            .collect();

        // Backfill from the global ranking when the category pool is short
        if pool.len() < self.k {
            for &i in &global {
                if pool.len() >= self.k {
                    break;
                }
                if !pool.contains(&i) {
                    pool.push(i);
                }
            }
        }

        pool.truncate(self.k);
        debug!(
            selected = pool.len(),
            candidates = all.len(),
            "retrieval selection complete"
        );
        pool.into_iter().map(|i| all[i].clone()).collect()
    }
}
