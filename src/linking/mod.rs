//! Linking retailer records to reference records.
//!
//! Linking runs in two stages:
//!
//! 1. **Exact**: identical external codes pair up with confidence 1.0. The
//!    first source record in input order wins a code.
//! 2. **Fuzzy**: remaining source records are scored against the remaining
//!    reference candidates (country-restricted, capped) with a
//!    [`RecordMatcher`]. All above-threshold edges are ordered by score,
//!    then source index, then reference index, and accepted greedily, so a
//!    contested reference goes to the higher score and the loser falls back
//!    to its next-best free candidate.
//!
//! Scoring is parallel; arbitration is sequential, so the result does not
//! depend on thread scheduling.

mod candidates;
mod config;
mod similarity;
mod traits;

pub use candidates::{CandidatePool, CountryFilter, select_candidates};
pub use config::LinkConfig;
pub use similarity::{TokenSortMatcher, key_similarity, token_sort_key, token_sort_similarity};
pub use traits::RecordMatcher;

use crate::model::{MatchMethod, ProductRecord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An accepted (source, reference) link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPair {
    /// Index into the source slice
    pub source: usize,
    /// Index into the reference slice
    pub reference: usize,
    pub method: MatchMethod,
    /// 0.0 - 1.0
    pub confidence: f64,
    /// 0 - 100; exact links are 100
    pub similarity: f64,
}

/// Required observability output of a linking pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkReport {
    pub source: String,
    pub source_total: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub unmatched: usize,
    pub match_rate: f64,
    /// Mean similarity of all accepted links (exact links count as 100)
    pub mean_similarity: f64,
    pub mean_fuzzy_similarity: f64,
    pub candidates_considered: usize,
    /// The candidate cap dropped eligible references
    pub candidate_cap_hit: bool,
}

/// Outcome of a linking pass.
#[derive(Debug, Clone, Default)]
pub struct LinkResult {
    /// Accepted links, ordered by source index
    pub pairs: Vec<LinkPair>,
    pub unmatched_source: Vec<usize>,
    pub unmatched_reference: Vec<usize>,
    pub report: LinkReport,
}

/// Two-stage record linker.
pub struct Linker {
    config: LinkConfig,
    matcher: Box<dyn RecordMatcher>,
}

impl Linker {
    /// Linker with the default token-sort matcher.
    #[must_use]
    pub fn new(config: LinkConfig) -> Self {
        Self::with_matcher(config, Box::new(TokenSortMatcher))
    }

    #[must_use]
    pub fn with_matcher(config: LinkConfig, matcher: Box<dyn RecordMatcher>) -> Self {
        Self { config, matcher }
    }

    #[must_use]
    pub const fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Link `source` records to `reference` records.
    ///
    /// Each reference is consumed by at most one source record in this pass
    /// and each source record links to at most one reference.
    #[must_use]
    pub fn link(
        &self,
        label: &str,
        source: &[ProductRecord],
        reference: &[ProductRecord],
        country_filter: Option<&CountryFilter>,
    ) -> LinkResult {
        let mut source_link: Vec<Option<LinkPair>> = vec![None; source.len()];
        let mut taken = vec![false; reference.len()];

        // Stage 1: exact codes
        let mut by_code: HashMap<&str, usize> = HashMap::with_capacity(reference.len());
        for (i, r) in reference.iter().enumerate() {
            if let Some(code) = r.code.as_deref() {
                by_code.entry(code).or_insert(i);
            }
        }
        for (s, record) in source.iter().enumerate() {
            let Some(r) = record.code.as_deref().and_then(|c| by_code.get(c).copied()) else {
                continue;
            };
            if taken[r] {
                continue;
            }
            taken[r] = true;
            source_link[s] = Some(LinkPair {
                source: s,
                reference: r,
                method: MatchMethod::Exact,
                confidence: 1.0,
                similarity: 100.0,
            });
        }

        // Stage 2: fuzzy fallback
        let remaining: Vec<usize> = (0..source.len())
            .filter(|s| source_link[*s].is_none())
            .collect();
        let mut pool = CandidatePool::default();
        if !self.config.exact_only && !remaining.is_empty() {
            pool = select_candidates(
                reference,
                &taken,
                country_filter,
                self.config.max_candidates,
            );
            if pool.truncated {
                tracing::warn!(
                    source = label,
                    eligible = pool.eligible,
                    cap = self.config.max_candidates,
                    "candidate cap reached; keeping most complete references"
                );
            }

            let edges = self.score_edges(source, reference, &remaining, &pool.indices);
            tracing::debug!(source = label, edges = edges.len(), "arbitrating fuzzy edges");
            for (s, r, score) in edges {
                if source_link[s].is_some() || taken[r] {
                    continue;
                }
                taken[r] = true;
                source_link[s] = Some(LinkPair {
                    source: s,
                    reference: r,
                    method: MatchMethod::Fuzzy,
                    confidence: score / 100.0,
                    similarity: score,
                });
            }
        }

        let unmatched_source: Vec<usize> = (0..source.len())
            .filter(|s| source_link[*s].is_none())
            .collect();
        let unmatched_reference: Vec<usize> = (0..reference.len()).filter(|r| !taken[*r]).collect();
        let pairs: Vec<LinkPair> = source_link.into_iter().flatten().collect();
        let report = build_report(label, source.len(), &pairs, &pool);

        tracing::info!(
            source = label,
            total = report.source_total,
            exact = report.exact,
            fuzzy = report.fuzzy,
            unmatched = report.unmatched,
            matcher = self.matcher.name(),
            "match rate {:.1}%, mean similarity {:.1}",
            report.match_rate * 100.0,
            report.mean_similarity
        );

        LinkResult {
            pairs,
            unmatched_source,
            unmatched_reference,
            report,
        }
    }

    /// All above-threshold (source, reference, score) edges, best first.
    fn score_edges(
        &self,
        source: &[ProductRecord],
        reference: &[ProductRecord],
        remaining: &[usize],
        candidates: &[usize],
    ) -> Vec<(usize, usize, f64)> {
        let matcher = self.matcher.as_ref();
        let threshold = self.config.threshold;

        let candidate_keys: Vec<(usize, String)> = candidates
            .iter()
            .map(|r| (*r, matcher.key(&reference[*r])))
            .filter(|(_, key)| !key.is_empty())
            .collect();

        let edges_for = |s: &usize| -> Vec<(usize, usize, f64)> {
            let key = matcher.key(&source[*s]);
            if key.is_empty() {
                return Vec::new();
            }
            candidate_keys
                .iter()
                .filter_map(|(r, ref_key)| {
                    let score = matcher.similarity(&key, ref_key);
                    (score >= threshold).then_some((*s, *r, score))
                })
                .collect()
        };

        let mut edges: Vec<(usize, usize, f64)> = if remaining.len() > self.config.parallel_threshold {
            remaining.par_iter().flat_map_iter(edges_for).collect()
        } else {
            remaining.iter().flat_map(edges_for).collect()
        };

        edges.sort_by(|a, b| {
            b.2.total_cmp(&a.2)
                .then_with(|| a.0.cmp(&b.0))
                .then_with(|| a.1.cmp(&b.1))
        });
        edges
    }
}

impl Default for Linker {
    fn default() -> Self {
        Self::new(LinkConfig::default())
    }
}

fn build_report(label: &str, total: usize, pairs: &[LinkPair], pool: &CandidatePool) -> LinkReport {
    let exact = pairs.iter().filter(|p| p.method == MatchMethod::Exact).count();
    let fuzzy = pairs.len() - exact;
    let mean = |values: &[f64]| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };
    let all: Vec<f64> = pairs.iter().map(|p| p.similarity).collect();
    let fuzzy_scores: Vec<f64> = pairs
        .iter()
        .filter(|p| p.method == MatchMethod::Fuzzy)
        .map(|p| p.similarity)
        .collect();

    LinkReport {
        source: label.to_string(),
        source_total: total,
        exact,
        fuzzy,
        unmatched: total - pairs.len(),
        match_rate: if total == 0 {
            0.0
        } else {
            pairs.len() as f64 / total as f64
        },
        mean_similarity: mean(&all),
        mean_fuzzy_similarity: mean(&fuzzy_scores),
        candidates_considered: pool.indices.len(),
        candidate_cap_hit: pool.truncated,
    }
}
