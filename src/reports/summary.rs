//! Summary report generator for shell output.

use super::{ReportError, ReportFormat, ReportGenerator, ReportMetadata};
use crate::pipeline::RunResult;
use crate::scoring::RankedCategory;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Pad `text` with spaces to `width` terminal columns, truncating with an
/// ellipsis when it is wider.
fn pad(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current <= width {
        return format!("{text}{}", " ".repeat(width - current));
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(1);
        if used + w > width.saturating_sub(1) {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    format!("{out}{}", " ".repeat(width.saturating_sub(used)))
}

const CATEGORY_WIDTH: usize = 28;

/// Summary reporter for shell output
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn ranking_lines(&self, ranking: &[RankedCategory], lines: &mut Vec<String>) {
        lines.push(self.color("Category Ranking", "bold"));
        lines.push(format!(
            "{:>4}  {}  {:>6}  {:>8}  {:>5}  {:>5}  {:>6}  {:<16}  {:>9}",
            "RANK",
            pad("CATEGORY", CATEGORY_WIDTH),
            "SCORE",
            "PRODUCTS",
            "POOR",
            "PL",
            "HHI",
            "REFORMULATION",
            "RANK±SD"
        ));
        lines.push(self.color(&"─".repeat(CATEGORY_WIDTH + 77), "dim"));

        for row in ranking {
            let m = &row.metrics;
            let reformulation = m.reformulation.reduction_pct().map_or_else(
                || m.reformulation.label().to_string(),
                |pct| format!("-{pct:.0}%"),
            );
            let stability = row.sensitivity.as_ref().map_or_else(
                || "-".to_string(),
                |s| format!("{:.1}±{:.1}", s.mean_rank, s.rank_stddev),
            );
            let score = format!("{:>6.3}", row.score);
            lines.push(format!(
                "{:>4}  {}  {}  {:>8}  {:>5.2}  {:>5.2}  {:>6.3}  {:<16}  {:>9}",
                row.rank,
                pad(&row.key, CATEGORY_WIDTH),
                if row.rank == 1 {
                    self.color(&score, "green")
                } else {
                    score
                },
                m.product_count,
                m.poor_grade_fraction,
                m.pl_penetration,
                m.concentration_index,
                reformulation,
                stability
            ));
        }

        let priced: Vec<&RankedCategory> = ranking
            .iter()
            .filter(|row| !row.metrics.price_gaps.is_empty())
            .collect();
        if !priced.is_empty() {
            lines.push(String::new());
            lines.push(self.color("PL discount by retailer:", "cyan"));
            for row in priced {
                let gaps: Vec<String> = row
                    .metrics
                    .price_gaps
                    .iter()
                    .map(|(retailer, gap)| format!("{retailer} {:.0}%", gap.pl_discount * 100.0))
                    .collect();
                lines.push(format!("  {}  {}", pad(&row.key, CATEGORY_WIDTH), gaps.join(", ")));
            }
        }
    }

    fn diagnostic_lines(&self, run: &RunResult, lines: &mut Vec<String>) {
        let d = &run.diagnostics;

        if !d.normalization.is_empty() {
            lines.push(self.color("Normalization:", "cyan"));
            for n in &d.normalization {
                lines.push(format!(
                    "  {}  {} in, {} kept, {} discarded, {} merged ({} conflicts), {} private label",
                    pad(&n.table, 14),
                    n.input,
                    n.output,
                    n.discarded(),
                    n.dedup.merged,
                    n.dedup.conflicts,
                    n.private_label
                ));
            }
        }

        if !d.grade_coverage.is_empty() {
            lines.push(self.color("Grade coverage:", "cyan"));
            for (table, c) in &d.grade_coverage {
                lines.push(format!(
                    "  {}  {:.1}% → {:.1}% ({} computed, {} not computable)",
                    pad(table, 14),
                    c.coverage_before() * 100.0,
                    c.coverage_after() * 100.0,
                    c.computed,
                    c.not_computable
                ));
            }
        }

        if let Some(cv) = &d.cross_validation
            && cv.compared > 0
        {
            lines.push(format!(
                "{}  {}/{} reported grades agree ({:.1}%), {} within one grade",
                self.color("Cross-validation:", "cyan"),
                cv.agreed,
                cv.compared,
                cv.agreement_rate * 100.0,
                cv.within_one
            ));
        }

        if !d.links.is_empty() {
            lines.push(self.color("Linking:", "cyan"));
            for l in &d.links {
                let cap = if l.candidate_cap_hit {
                    self.color(" (candidate cap hit)", "yellow")
                } else {
                    String::new()
                };
                lines.push(format!(
                    "  {}  {} records: {} exact, {} fuzzy, {} unmatched ({:.1}% matched, mean similarity {:.1}){}",
                    pad(&l.source, 14),
                    l.source_total,
                    l.exact,
                    l.fuzzy,
                    l.unmatched,
                    l.match_rate * 100.0,
                    l.mean_similarity,
                    cap
                ));
            }
        }

        if !run.unranked.is_empty() {
            let names: Vec<String> = run
                .unranked
                .iter()
                .map(|m| format!("{} ({})", m.key, m.product_count))
                .collect();
            lines.push(format!(
                "{}  {}",
                self.color("Not ranked:", "dim"),
                names.join(", ")
            ));
        }
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate(&self, run: &RunResult, metadata: &ReportMetadata) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        lines.push(self.color("Private-Label Opportunity", "bold"));
        lines.push(self.color(&"─".repeat(40), "dim"));
        if let Some(reference) = &metadata.reference_path {
            lines.push(format!("{}  {}", self.color("Reference:", "cyan"), reference));
        }
        for retailer in &metadata.retailer_paths {
            lines.push(format!("{}  {}", self.color("Retailer:", "cyan"), retailer));
        }
        lines.push(String::new());

        if !run.ranking.is_empty() {
            self.ranking_lines(&run.ranking, &mut lines);
            lines.push(String::new());
        } else if metadata.command == "rank" {
            lines.push(format!("  {}", self.color("No rankable categories", "yellow")));
            lines.push(String::new());
        }

        self.diagnostic_lines(run, &mut lines);
        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Summary
    }
}
