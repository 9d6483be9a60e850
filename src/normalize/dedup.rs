//! Merge records that share an exact external code.

use crate::model::ProductRecord;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

/// Outcome counters of a deduplication pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupReport {
    pub input: usize,
    /// Records absorbed into an earlier record with the same code
    pub merged: usize,
    /// Merges where the two records carried different attributes
    pub conflicts: usize,
    pub output: usize,
}

#[derive(Hash, PartialEq, Eq)]
enum DedupKey {
    Code(String),
    Position(usize),
}

/// Collapse records with the same code.
///
/// The record with the highest `ingest_seq` wins. The surviving record takes
/// the position where its code first appeared, so output order is stable.
/// Records without a code are never merged.
#[must_use]
pub fn deduplicate(records: Vec<ProductRecord>) -> (Vec<ProductRecord>, DedupReport) {
    let mut report = DedupReport {
        input: records.len(),
        ..DedupReport::default()
    };
    let mut kept: IndexMap<DedupKey, ProductRecord> = IndexMap::with_capacity(records.len());

    for (position, record) in records.into_iter().enumerate() {
        let key = record
            .code
            .clone()
            .map_or(DedupKey::Position(position), DedupKey::Code);
        match kept.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                report.merged += 1;
                let existing = slot.get();
                if existing.fingerprint() != record.fingerprint() {
                    report.conflicts += 1;
                    tracing::debug!(
                        code = record.code.as_deref().unwrap_or_default(),
                        "conflicting duplicate code"
                    );
                }
                if record.ingest_seq >= existing.ingest_seq {
                    slot.insert(record);
                }
            }
        }
    }

    report.output = kept.len();
    (kept.into_values().collect(), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordSource;

    fn record(code: Option<&str>, name: &str, seq: u64) -> ProductRecord {
        let mut r = ProductRecord::new(RecordSource::Reference, seq);
        r.code = code.map(str::to_string);
        r.name = Some(name.to_string());
        r
    }

    #[test]
    fn test_most_recent_wins_and_conflict_counted() {
        let input = vec![
            record(Some("1"), "old", 0),
            record(Some("2"), "other", 1),
            record(Some("1"), "new", 2),
        ];
        let (out, report) = deduplicate(input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name.as_deref(), Some("new"));
        assert_eq!(out[1].name.as_deref(), Some("other"));
        assert_eq!(report.merged, 1);
        assert_eq!(report.conflicts, 1);
        assert_eq!(report.output, 2);
    }

    #[test]
    fn test_identical_duplicates_are_not_conflicts() {
        let input = vec![record(Some("1"), "same", 0), record(Some("1"), "same", 5)];
        let (out, report) = deduplicate(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ingest_seq, 5);
        assert_eq!(report.conflicts, 0);
    }

    #[test]
    fn test_recency_uses_ingest_seq_not_position() {
        let input = vec![record(Some("1"), "newer", 9), record(Some("1"), "older", 3)];
        let (out, _) = deduplicate(input);
        assert_eq!(out[0].name.as_deref(), Some("newer"));
    }

    #[test]
    fn test_codeless_records_kept() {
        let input = vec![record(None, "a", 0), record(None, "a", 1)];
        let (out, report) = deduplicate(input);
        assert_eq!(out.len(), 2);
        assert_eq!(report.merged, 0);
    }
}
