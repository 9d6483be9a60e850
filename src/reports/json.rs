//! JSON report generator.

use super::{ReportError, ReportFormat, ReportGenerator, ReportMetadata};
use crate::metrics::CategoryMetrics;
use crate::pipeline::{Diagnostics, RunResult, RunSettings};
use crate::scoring::RankedCategory;
use chrono::Utc;
use serde::Serialize;

/// JSON report generator
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate(&self, run: &RunResult, metadata: &ReportMetadata) -> Result<String, ReportError> {
        let report = JsonRunReport {
            metadata: JsonReportMetadata {
                tool: ToolInfo {
                    name: env!("CARGO_PKG_NAME"),
                    version: env!("CARGO_PKG_VERSION"),
                },
                generated_at: Utc::now().to_rfc3339(),
                command: &metadata.command,
                reference: metadata.reference_path.as_deref(),
                retailers: &metadata.retailer_paths,
            },
            settings: run.settings.as_ref(),
            ranking: &run.ranking,
            unranked: &run.unranked,
            diagnostics: &run.diagnostics,
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        json.map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

#[derive(Serialize)]
struct JsonRunReport<'a> {
    metadata: JsonReportMetadata<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<&'a RunSettings>,
    ranking: &'a [RankedCategory],
    unranked: &'a [CategoryMetrics],
    diagnostics: &'a Diagnostics,
}

#[derive(Serialize)]
struct JsonReportMetadata<'a> {
    tool: ToolInfo,
    generated_at: String,
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<&'a str>,
    retailers: &'a [String],
}

#[derive(Serialize)]
struct ToolInfo {
    name: &'static str,
    version: &'static str,
}
