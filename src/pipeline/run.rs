//! Stage orchestration: load → normalize → grade → link → join → metrics →
//! score.
//!
//! Every table is loaded and schema-checked before the first stage runs.

use super::ingest::{RetailerFeed, load_reference, load_retailer};
use crate::config::AppConfig;
use crate::error::{OpportunityError, Result};
use crate::linking::{CountryFilter, LinkReport, LinkResult, Linker};
use crate::metrics::{CategoryMetrics, compute_category_metrics};
use crate::model::{EnrichedProduct, ProductRecord, RetailerMatch};
use crate::normalize::{NormalizationReport, Normalizer};
use crate::nutriscore::{
    CrossValidationReport, GradeCoverageReport, cross_validate, fill_missing_grades,
};
use crate::scoring::{OpportunityScorer, RankedCategory, ScoringWeights, SensitivityConfig};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Files making up one run.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub reference: PathBuf,
    pub retailers: Vec<RetailerFeed>,
}

/// Raw records of every input table, schema-checked.
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub reference: Vec<ProductRecord>,
    pub retailers: Vec<RetailerTable>,
}

/// Records of one retailer feed.
#[derive(Debug, Clone)]
pub struct RetailerTable {
    pub id: String,
    pub country: String,
    pub records: Vec<ProductRecord>,
}

impl RawTables {
    /// Load and schema-check every table.
    pub fn load(inputs: &PipelineInputs) -> Result<Self> {
        ensure_unique_feed_ids(inputs.retailers.iter().map(|feed| feed.id.as_str()))?;
        let reference = load_reference(&inputs.reference)?;
        let retailers = inputs
            .retailers
            .iter()
            .map(|feed| {
                Ok(RetailerTable {
                    id: feed.id.clone(),
                    country: feed.country.clone(),
                    records: load_retailer(feed)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            reference,
            retailers,
        })
    }
}

/// Reject runs where two retailer feeds share an id.
///
/// Per-feed diagnostics and enriched matches are keyed by feed id, so a
/// repeated id would silently merge two feeds.
pub fn ensure_unique_feed_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id == "reference" {
            return Err(OpportunityError::validation(
                "retailer feed id 'reference' is reserved for the reference table",
            ));
        }
        if !seen.insert(id) {
            return Err(OpportunityError::validation(format!(
                "retailer feed id '{id}' is used more than once"
            )));
        }
    }
    Ok(())
}

/// Non-ranking outputs of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub normalization: Vec<NormalizationReport>,
    /// Keyed by table name
    pub grade_coverage: IndexMap<String, GradeCoverageReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_validation: Option<CrossValidationReport>,
    pub links: Vec<LinkReport>,
}

/// Settings that shaped a ranking, echoed into reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    pub link_threshold: f64,
    pub weights: ScoringWeights,
    pub sensitivity: SensitivityConfig,
}

/// Everything a run produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub ranking: Vec<RankedCategory>,
    /// Categories reported but excluded from ranking
    pub unranked: Vec<CategoryMetrics>,
    #[serde(skip)]
    pub enriched: Vec<EnrichedProduct>,
    pub diagnostics: Diagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<RunSettings>,
}

/// Normalized tables with their reports.
#[derive(Debug, Clone, Default)]
pub struct CleanTables {
    pub reference: Vec<ProductRecord>,
    pub retailers: Vec<RetailerTable>,
    pub reports: Vec<NormalizationReport>,
}

/// Normalize every table against the configured lookup tables.
pub fn normalize_stage(raw: RawTables, config: &AppConfig) -> Result<CleanTables> {
    ensure_unique_feed_ids(raw.retailers.iter().map(|table| table.id.as_str()))?;
    let categories = config.normalizer.load_category_map()?;
    let private_labels = config.normalizer.private_label_registry();
    tracing::debug!(brands = ?private_labels.summary(), "private-label registry");
    let normalizer = Normalizer::new(&categories, &private_labels);

    let reference = normalizer.normalize_table("reference", raw.reference);
    let mut reports = vec![reference.report];
    let retailers = raw
        .retailers
        .into_iter()
        .map(|table| {
            let clean = normalizer.normalize_table(&table.id, table.records);
            reports.push(clean.report);
            RetailerTable {
                records: clean.records,
                ..table
            }
        })
        .collect();

    Ok(CleanTables {
        reference: reference.records,
        retailers,
        reports,
    })
}

/// Cross-validate reported grades, then fill missing grades in every table.
pub fn grade_stage(tables: &mut CleanTables, diagnostics: &mut Diagnostics) {
    diagnostics.cross_validation = Some(cross_validate(&tables.reference));
    let coverage = fill_missing_grades(&mut tables.reference);
    log_coverage("reference", &coverage);
    diagnostics
        .grade_coverage
        .insert("reference".to_string(), coverage);
    for table in &mut tables.retailers {
        let coverage = fill_missing_grades(&mut table.records);
        log_coverage(&table.id, &coverage);
        diagnostics.grade_coverage.insert(table.id.clone(), coverage);
    }
}

fn log_coverage(table: &str, coverage: &GradeCoverageReport) {
    tracing::info!(
        table,
        computed = coverage.computed,
        not_computable = coverage.not_computable,
        coverage_before = coverage.coverage_before(),
        coverage_after = coverage.coverage_after(),
        "filled missing grades"
    );
}

/// Link each retailer feed against the reference table independently.
#[must_use]
pub fn link_stage(tables: &CleanTables, linker: &Linker) -> Vec<LinkResult> {
    tables
        .retailers
        .iter()
        .map(|table| {
            let filter = CountryFilter::new(&table.country);
            tracing::debug!(retailer = %table.id, countries = ?filter.names(), "linking feed");
            linker.link(&table.id, &table.records, &tables.reference, Some(&filter))
        })
        .collect()
}

/// Build the enriched joined table.
///
/// Every reference record yields one row carrying its retailer matches.
/// Unmatched retailer records become standalone rows when
/// `include_unmatched` is set.
#[must_use]
pub fn join_stage(
    tables: CleanTables,
    links: &[LinkResult],
    include_unmatched: bool,
) -> Vec<EnrichedProduct> {
    let mut rows: Vec<EnrichedProduct> = tables
        .reference
        .into_iter()
        .map(EnrichedProduct::standalone)
        .collect();
    let reference_rows = rows.len();

    for (table, result) in tables.retailers.into_iter().zip(links) {
        let mut linked = vec![false; table.records.len()];
        for pair in &result.pairs {
            linked[pair.source] = true;
            let record = &table.records[pair.source];
            rows[pair.reference].matches.push(RetailerMatch {
                retailer: table.id.clone(),
                country: table.country.clone(),
                name: record.name.clone(),
                brand: record.brand.clone(),
                price: record.price,
                is_private_label: record.is_private_label,
                method: pair.method,
                confidence: pair.confidence,
            });
        }
        if include_unmatched {
            rows.extend(
                table
                    .records
                    .into_iter()
                    .zip(linked)
                    .filter(|(_, was_linked)| !was_linked)
                    .map(|(record, _)| EnrichedProduct::standalone(record)),
            );
        }
    }

    tracing::info!(
        rows = rows.len(),
        reference = reference_rows,
        standalone_retailer = rows.len() - reference_rows,
        "built enriched table"
    );
    rows
}

/// Run every stage on already-loaded tables.
pub fn run_tables(raw: RawTables, config: &AppConfig) -> Result<RunResult> {
    let scorer = OpportunityScorer::new(config.scoring.weights)?;
    let linker = Linker::new(config.linking.clone());
    let mut diagnostics = Diagnostics::default();

    let mut tables = normalize_stage(raw, config)?;
    diagnostics.normalization = std::mem::take(&mut tables.reports);
    grade_stage(&mut tables, &mut diagnostics);

    let links = link_stage(&tables, &linker);
    diagnostics.links = links.iter().map(|l| l.report.clone()).collect();

    let enriched = join_stage(tables, &links, config.metrics.include_unmatched_retailer);
    let metrics = compute_category_metrics(&enriched, config.metrics.level);
    let (rankable, unranked): (Vec<_>, Vec<_>) = metrics
        .into_iter()
        .partition(|m| m.is_rankable(&config.metrics));
    if !unranked.is_empty() {
        tracing::info!(
            unranked = unranked.len(),
            "categories excluded from ranking (Unknown or below min_products)"
        );
    }

    let sensitivity = config.sensitivity.enabled.then_some(&config.sensitivity);
    let ranking = scorer.rank(rankable, sensitivity)?;

    Ok(RunResult {
        ranking,
        unranked,
        enriched,
        diagnostics,
        settings: Some(RunSettings {
            link_threshold: config.linking.threshold,
            weights: *scorer.weights(),
            sensitivity: config.sensitivity.clone(),
        }),
    })
}

/// Load the inputs and run every stage.
pub fn run(inputs: &PipelineInputs, config: &AppConfig) -> Result<RunResult> {
    let raw = RawTables::load(inputs)?;
    run_tables(raw, config)
}

/// Normalize and grade a single reference table.
pub fn grade_only(path: &std::path::Path, config: &AppConfig) -> Result<RunResult> {
    let raw = RawTables {
        reference: load_reference(path)?,
        retailers: Vec::new(),
    };
    let mut diagnostics = Diagnostics::default();
    let mut tables = normalize_stage(raw, config)?;
    diagnostics.normalization = std::mem::take(&mut tables.reports);
    grade_stage(&mut tables, &mut diagnostics);
    Ok(RunResult {
        enriched: tables
            .reference
            .into_iter()
            .map(EnrichedProduct::standalone)
            .collect(),
        diagnostics,
        ..RunResult::default()
    })
}

/// Normalize and link, reporting per-feed link statistics.
pub fn link_only(inputs: &PipelineInputs, config: &AppConfig) -> Result<RunResult> {
    let raw = RawTables::load(inputs)?;
    let mut diagnostics = Diagnostics::default();
    let mut tables = normalize_stage(raw, config)?;
    diagnostics.normalization = std::mem::take(&mut tables.reports);
    let links = link_stage(&tables, &Linker::new(config.linking.clone()));
    diagnostics.links = links.iter().map(|l| l.report.clone()).collect();
    Ok(RunResult {
        enriched: join_stage(tables, &links, config.metrics.include_unmatched_retailer),
        diagnostics,
        ..RunResult::default()
    })
}
