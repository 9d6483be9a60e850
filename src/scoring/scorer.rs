//! Composite opportunity score and ranking.

use super::components::{Components, normalize_columns};
use super::sensitivity::{SensitivityConfig, SensitivitySummary, analyze};
use super::weights::ScoringWeights;
use crate::metrics::CategoryMetrics;
use crate::{OpportunityError, Result};
use serde::{Deserialize, Serialize};

/// One row of the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCategory {
    /// 1-based position, score descending then key ascending
    pub rank: usize,
    pub key: String,
    pub score: f64,
    pub raw_components: Components,
    pub normalized_components: Components,
    pub metrics: CategoryMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<SensitivitySummary>,
}

/// Ranks categories by weighted, normalized opportunity components.
#[derive(Debug, Clone, Default)]
pub struct OpportunityScorer {
    weights: ScoringWeights,
}

impl OpportunityScorer {
    /// Create a scorer. Weights not summing to 1 are rescaled.
    pub fn new(weights: ScoringWeights) -> Result<Self> {
        let arr = weights.as_array();
        if arr.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(OpportunityError::validation(
                "scoring weights must be finite and non-negative",
            ));
        }
        if weights.sum() <= 0.0 {
            return Err(OpportunityError::validation(
                "scoring weights must not all be zero",
            ));
        }
        if !weights.is_normalized() {
            tracing::warn!(sum = weights.sum(), "scoring weights do not sum to 1, rescaling");
        }
        Ok(Self {
            weights: weights.renormalize(),
        })
    }

    #[must_use]
    pub const fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score and rank `categories`.
    ///
    /// Normalization is over exactly this set, so callers filter out
    /// non-rankable categories first. Sensitivity is skipped when
    /// `sensitivity` is `None` or disabled.
    pub fn rank(
        &self,
        categories: Vec<CategoryMetrics>,
        sensitivity: Option<&SensitivityConfig>,
    ) -> Result<Vec<RankedCategory>> {
        let raw: Vec<Components> = categories.iter().map(Components::from_metrics).collect();
        let normalized = normalize_columns(&raw);
        let keys: Vec<String> = categories.iter().map(|m| m.key.clone()).collect();

        let mut summaries: Vec<Option<SensitivitySummary>> = match sensitivity {
            Some(config) if config.enabled && !categories.is_empty() => {
                analyze(&normalized, &keys, config)?
                    .into_iter()
                    .map(Some)
                    .collect()
            }
            _ => vec![None; categories.len()],
        };

        let mut ranked: Vec<RankedCategory> = categories
            .into_iter()
            .zip(raw)
            .zip(&normalized)
            .zip(summaries.iter_mut())
            .map(|(((metrics, raw), row), summary)| RankedCategory {
                rank: 0,
                key: metrics.key.clone(),
                score: self.weights.apply(row),
                raw_components: raw,
                normalized_components: Components::from_normalized(*row),
                metrics,
                sensitivity: summary.take(),
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.key.cmp(&b.key)));
        for (i, row) in ranked.iter_mut().enumerate() {
            row.rank = i + 1;
        }

        if let Some(top) = ranked.first() {
            tracing::info!(
                categories = ranked.len(),
                top = %top.key,
                score = top.score,
                "ranked categories"
            );
        }
        Ok(ranked)
    }
}
