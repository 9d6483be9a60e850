//! Monte-Carlo sensitivity of the ranking to the scoring weights.
//!
//! Weight vectors are drawn from a symmetric Dirichlet distribution with a
//! seeded [`StdRng`]. Draws are generated sequentially, evaluated in
//! parallel and aggregated in draw order, so results depend only on the
//! seed.

use super::weights::{COMPONENT_COUNT, ScoringWeights};
use crate::{OpportunityError, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Dirichlet, Distribution};
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sensitivity analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SensitivityConfig {
    pub enabled: bool,
    /// Number of weight vectors drawn
    pub draws: usize,
    /// Symmetric Dirichlet concentration
    pub alpha: f64,
    pub seed: u64,
    /// Rank cutoff for the stability fraction
    pub top_k: usize,
    /// Keep every per-draw score in the output
    pub keep_draws: bool,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            draws: 1000,
            alpha: 1.0,
            seed: 42,
            top_k: 5,
            keep_draws: false,
        }
    }
}

/// Score and rank distribution of one category over all draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySummary {
    pub mean_score: f64,
    pub score_stddev: f64,
    pub mean_rank: f64,
    pub rank_stddev: f64,
    pub min_rank: usize,
    pub max_rank: usize,
    /// Fraction of draws with rank <= top_k
    pub top_k_stability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_scores: Option<Vec<f64>>,
}

/// 1-based ranks for `scores`: higher score first, ties by `keys` ascending.
#[must_use]
pub fn rank_positions(scores: &[f64], keys: &[String]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| {
        scores[*b]
            .total_cmp(&scores[*a])
            .then_with(|| keys[*a].cmp(&keys[*b]))
    });
    let mut ranks = vec![0; scores.len()];
    for (position, index) in order.into_iter().enumerate() {
        ranks[index] = position + 1;
    }
    ranks
}

/// Draw `config.draws` weight vectors.
pub fn draw_weights(config: &SensitivityConfig) -> Result<Vec<ScoringWeights>> {
    let dirichlet = Dirichlet::new_with_size(config.alpha, COMPONENT_COUNT)
        .map_err(|e| OpportunityError::validation(format!("sensitivity.alpha: {e}")))?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    Ok((0..config.draws)
        .map(|_| {
            let sample: Vec<f64> = dirichlet.sample(&mut rng);
            let mut w = [0.0; COMPONENT_COUNT];
            for (slot, value) in w.iter_mut().zip(sample) {
                *slot = value;
            }
            ScoringWeights::from_array(w)
        })
        .collect())
}

/// Run the analysis over normalized component rows.
///
/// `rows[i]` and `keys[i]` describe the same category. Returns one summary
/// per row, in row order.
pub fn analyze(
    rows: &[[f64; COMPONENT_COUNT]],
    keys: &[String],
    config: &SensitivityConfig,
) -> Result<Vec<SensitivitySummary>> {
    if rows.len() != keys.len() {
        return Err(OpportunityError::validation(
            "sensitivity rows and keys differ in length",
        ));
    }
    let weights = draw_weights(config)?;

    let per_draw: Vec<(Vec<f64>, Vec<usize>)> = weights
        .par_iter()
        .map(|w| {
            let scores: Vec<f64> = rows.iter().map(|row| w.apply(row)).collect();
            let ranks = rank_positions(&scores, keys);
            (scores, ranks)
        })
        .collect();

    let summaries = (0..rows.len())
        .map(|i| {
            let scores: Vec<f64> = per_draw.iter().map(|(s, _)| s[i]).collect();
            let ranks: Vec<usize> = per_draw.iter().map(|(_, r)| r[i]).collect();
            summarize(scores, &ranks, config)
        })
        .collect();

    tracing::info!(
        draws = config.draws,
        seed = config.seed,
        categories = rows.len(),
        "sensitivity analysis complete"
    );
    Ok(summaries)
}

fn summarize(scores: Vec<f64>, ranks: &[usize], config: &SensitivityConfig) -> SensitivitySummary {
    let rank_values: Vec<f64> = ranks.iter().map(|r| *r as f64).collect();
    let (mean_score, score_stddev) = mean_and_stddev(&scores);
    let (mean_rank, rank_stddev) = mean_and_stddev(&rank_values);
    let in_top = ranks.iter().filter(|r| **r <= config.top_k).count();

    SensitivitySummary {
        mean_score,
        score_stddev,
        mean_rank,
        rank_stddev,
        min_rank: ranks.iter().copied().min().unwrap_or(0),
        max_rank: ranks.iter().copied().max().unwrap_or(0),
        top_k_stability: if ranks.is_empty() {
            0.0
        } else {
            in_top as f64 / ranks.len() as f64
        },
        draw_scores: config.keep_draws.then_some(scores),
    }
}

/// Mean and sample standard deviation (0 for fewer than two values).
fn mean_and_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}
