//! Record cleaning, category harmonization, private-label flagging and
//! deduplication.
//!
//! The [`Normalizer`] turns lifted raw records into canonical
//! [`ProductRecord`]s or discards them with a [`DiscardReason`]. Cleaning is
//! per record and runs in parallel; deduplication runs afterwards in input
//! order so its most-recent-wins rule is independent of scheduling.
//!
//! Normalizing already-normalized records is a no-op.

mod category_map;
mod dedup;
mod private_label;
pub mod text;

pub use category_map::{CategoryEntry, CategoryMap};
pub use dedup::{DedupReport, deduplicate};
pub use private_label::PrivateLabelRegistry;

use crate::model::ProductRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use text::{normalize_brand, normalize_code, normalize_name, normalize_tag};

/// Why a raw record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// Neither a code nor a name was supplied
    MissingIdentity,
    /// Identity fields were supplied but nothing usable survived cleaning
    EmptyAfterCleaning,
}

impl DiscardReason {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingIdentity => "missing_identity",
            Self::EmptyAfterCleaning => "empty_after_cleaning",
        }
    }
}

impl std::fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-table normalization diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub table: String,
    pub input: usize,
    pub missing_identity: usize,
    pub empty_after_cleaning: usize,
    pub private_label: usize,
    pub unknown_category: usize,
    pub dedup: DedupReport,
    pub output: usize,
}

impl NormalizationReport {
    #[must_use]
    pub const fn discarded(&self) -> usize {
        self.missing_identity + self.empty_after_cleaning
    }
}

/// Records of one table after normalization, with its report.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub records: Vec<ProductRecord>,
    pub report: NormalizationReport,
}

/// Cleans raw records against immutable lookup tables.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    categories: &'a CategoryMap,
    private_labels: &'a PrivateLabelRegistry,
}

impl<'a> Normalizer<'a> {
    #[must_use]
    pub const fn new(categories: &'a CategoryMap, private_labels: &'a PrivateLabelRegistry) -> Self {
        Self {
            categories,
            private_labels,
        }
    }

    /// Clean one record, or say why it cannot be kept.
    pub fn normalize_record(&self, mut record: ProductRecord) -> Result<ProductRecord, DiscardReason> {
        if record.code.is_none() && record.name.is_none() {
            return Err(DiscardReason::MissingIdentity);
        }

        record.code = record.code.as_deref().and_then(normalize_code);
        record.name = record.name.as_deref().and_then(normalize_name);
        if record.code.is_none() && record.name.is_none() {
            return Err(DiscardReason::EmptyAfterCleaning);
        }

        record.brand = record.brand.as_deref().and_then(normalize_brand);
        record.categories = record.categories.filter_map(normalize_tag);
        record.labels = record.labels.filter_map(normalize_tag);
        record.countries = record.countries.filter_map(normalize_tag);
        record.nutrients = record.nutrients.sanitized();
        record.price = record.price.filter(|p| p.is_finite() && *p >= 0.0);

        record.category = self.categories.harmonize(&record.categories);
        record.is_private_label = self
            .private_labels
            .is_private_label(&record.source, record.brand.as_deref());
        Ok(record)
    }

    /// Clean and deduplicate a whole table.
    #[must_use]
    pub fn normalize_table(&self, table: &str, records: Vec<ProductRecord>) -> NormalizedTable {
        let input = records.len();
        let outcomes: Vec<Result<ProductRecord, DiscardReason>> = records
            .into_par_iter()
            .map(|r| self.normalize_record(r))
            .collect();

        let mut report = NormalizationReport {
            table: table.to_string(),
            input,
            ..NormalizationReport::default()
        };
        let mut cleaned = Vec::with_capacity(outcomes.len());
        for (row, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(record) => cleaned.push(record),
                Err(reason) => {
                    tracing::debug!(table, row, %reason, "discarding record");
                    match reason {
                        DiscardReason::MissingIdentity => report.missing_identity += 1,
                        DiscardReason::EmptyAfterCleaning => report.empty_after_cleaning += 1,
                    }
                }
            }
        }

        let (records, dedup) = deduplicate(cleaned);
        report.dedup = dedup;
        report.output = records.len();
        report.private_label = records.iter().filter(|r| r.is_private_label).count();
        report.unknown_category = records.iter().filter(|r| r.category.is_unknown()).count();

        tracing::info!(
            table,
            input,
            kept = report.output,
            discarded = report.discarded(),
            dedup_conflicts = report.dedup.conflicts,
            "normalized table"
        );

        NormalizedTable { records, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, MultiValue, RecordSource};

    fn tables() -> (CategoryMap, PrivateLabelRegistry) {
        (CategoryMap::with_builtins(), PrivateLabelRegistry::with_builtins())
    }

    fn raw(code: Option<&str>, name: Option<&str>, brand: Option<&str>) -> ProductRecord {
        let mut r = ProductRecord::new(RecordSource::retailer("mercadona", "es"), 0);
        r.code = code.map(str::to_string);
        r.name = name.map(str::to_string);
        r.brand = brand.map(str::to_string);
        r
    }

    #[test]
    fn test_discard_reasons() {
        let (cats, pl) = tables();
        let normalizer = Normalizer::new(&cats, &pl);
        assert_eq!(
            normalizer.normalize_record(raw(None, None, Some("x"))),
            Err(DiscardReason::MissingIdentity)
        );
        assert_eq!(
            normalizer.normalize_record(raw(Some("  "), Some("   "), None)),
            Err(DiscardReason::EmptyAfterCleaning)
        );
    }

    #[test]
    fn test_record_cleaning_and_flags() {
        let (cats, pl) = tables();
        let normalizer = Normalizer::new(&cats, &pl);
        let mut record = raw(Some(" 84 1 "), Some("  Yogur  natural "), Some("HACENDADO, Mercadona"));
        record.categories = MultiValue::from_delimited("EN:Dairies, en:yogurts");
        let out = normalizer.normalize_record(record).expect("kept");
        assert_eq!(out.code.as_deref(), Some("841"));
        assert_eq!(out.name.as_deref(), Some("Yogur natural"));
        assert_eq!(out.brand.as_deref(), Some("hacendado"));
        assert!(out.is_private_label);
        assert_eq!(out.category, Category::new("Dairy", "Yogurts"));
    }

    #[test]
    fn test_table_is_idempotent() {
        let (cats, pl) = tables();
        let normalizer = Normalizer::new(&cats, &pl);
        let mut records = vec![
            raw(Some("1"), Some("A"), Some("Nestlé")),
            raw(None, None, None),
            raw(Some("1"), Some("B"), Some("nestle")),
            raw(None, Some(" C "), Some("Deliplus")),
        ];
        for (seq, r) in records.iter_mut().enumerate() {
            r.ingest_seq = seq as u64;
        }
        let first = normalizer.normalize_table("mercadona", records);
        assert_eq!(first.report.missing_identity, 1);
        assert_eq!(first.report.dedup.conflicts, 1);

        let second = normalizer.normalize_table("mercadona", first.records.clone());
        assert_eq!(second.records, first.records);
        assert_eq!(second.report.discarded(), 0);
        assert_eq!(second.report.dedup.merged, 0);
    }
}
