//! Pluggable similarity strategy for the fuzzy linking stage.

use crate::model::ProductRecord;

/// Similarity scoring between a source and a reference record.
///
/// Keys are computed once per record and compared pairwise, so the
/// expensive text preparation stays out of the O(n·m) loop.
pub trait RecordMatcher: Send + Sync {
    /// Comparison key for a record. An empty key never matches.
    fn key(&self, record: &ProductRecord) -> String;

    /// Similarity of two keys on a 0 - 100 scale.
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Human-readable strategy name, used in logs.
    fn name(&self) -> &'static str;
}
