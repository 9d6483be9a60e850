//! CSV report generator.
//!
//! A ranking run yields one row per ranked category. Runs without a ranking
//! fall back to one row per linked retailer feed.

use super::{ReportError, ReportFormat, ReportGenerator, ReportMetadata};
use crate::pipeline::RunResult;
use crate::scoring::RankedCategory;
use std::fmt::Write as _;

/// CSV report generator.
pub struct CsvReporter;

impl CsvReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

const RANKING_HEADER: &str = "rank,category,score,products,poor_grade_fraction,pl_penetration,\
pl_penetration_healthy,concentration_index,nutritional_gap,reformulation,reduction_pct,\
pl_discount,mean_rank,rank_stddev,top_k_stability";

const LINK_HEADER: &str =
    "retailer,source_total,exact,fuzzy,unmatched,match_rate,mean_similarity,candidate_cap_hit";

impl ReportGenerator for CsvReporter {
    fn generate(&self, run: &RunResult, _metadata: &ReportMetadata) -> Result<String, ReportError> {
        let mut content = String::new();

        if !run.ranking.is_empty() {
            writeln!(content, "{RANKING_HEADER}")?;
            for row in &run.ranking {
                write_ranking_line(&mut content, row)?;
            }
            return Ok(content);
        }

        if !run.diagnostics.links.is_empty() {
            writeln!(content, "{LINK_HEADER}")?;
            for link in &run.diagnostics.links {
                writeln!(
                    content,
                    "\"{}\",{},{},{},{},{:.4},{:.2},{}",
                    escape_csv(&link.source),
                    link.source_total,
                    link.exact,
                    link.fuzzy,
                    link.unmatched,
                    link.match_rate,
                    link.mean_similarity,
                    link.candidate_cap_hit
                )?;
            }
            return Ok(content);
        }

        Err(ReportError::Unsupported {
            format: ReportFormat::Csv,
            reason: "the run produced neither a ranking nor link reports".to_string(),
        })
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }
}

fn write_ranking_line(content: &mut String, row: &RankedCategory) -> std::fmt::Result {
    let m = &row.metrics;
    let sensitivity = row.sensitivity.as_ref();
    writeln!(
        content,
        "{},\"{}\",{:.6},{},{:.4},{:.4},{:.4},{:.4},{:.4},{},{},{},{},{},{}",
        row.rank,
        escape_csv(&row.key),
        row.score,
        m.product_count,
        m.poor_grade_fraction,
        m.pl_penetration,
        m.pl_penetration_healthy,
        m.concentration_index,
        m.nutritional_gap,
        m.reformulation.label(),
        optional(m.reformulation.reduction_pct(), 1),
        optional(m.price_gap.map(|p| p.pl_discount), 4),
        optional(sensitivity.map(|s| s.mean_rank), 2),
        optional(sensitivity.map(|s| s.rank_stddev), 2),
        optional(sensitivity.map(|s| s.top_k_stability), 3),
    )
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(String::new, |v| format!("{v:.precision$}"))
}

/// Escape a string for CSV embedding: double-quote escaping per RFC 4180,
/// plus newline flattening since fields are already wrapped in double quotes.
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linking::LinkReport;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("Dairy \"fresh\"\nline"), "Dairy \"\"fresh\"\" line");
    }

    #[test]
    fn test_optional_formatting() {
        assert_eq!(optional(Some(55.04), 1), "55.0");
        assert_eq!(optional(None, 1), "");
    }

    #[test]
    fn test_link_fallback_and_empty_run() {
        let mut run = RunResult::default();
        let metadata = ReportMetadata::default();
        assert!(CsvReporter::new().generate(&run, &metadata).is_err());

        run.diagnostics.links.push(LinkReport {
            source: "ah".to_string(),
            source_total: 10,
            exact: 6,
            fuzzy: 2,
            unmatched: 2,
            match_rate: 0.8,
            ..LinkReport::default()
        });
        let out = CsvReporter::new().generate(&run, &metadata).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some(LINK_HEADER));
        assert_eq!(lines.next(), Some("\"ah\",10,6,2,2,0.8000,0.00,false"));
    }
}
