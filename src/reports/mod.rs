//! Report generation for pipeline runs.
//!
//! - JSON: ranking and diagnostics for programmatic use
//! - CSV: one row per ranked category, for spreadsheets
//! - Summary: aligned terminal table with diagnostics

mod csv;
mod json;
mod summary;
mod types;

pub use csv::CsvReporter;
pub use json::JsonReporter;
pub use summary::SummaryReporter;
pub use types::{ReportFormat, ReportMetadata};

use crate::pipeline::RunResult;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Nothing to report in {format} format: {reason}")]
    Unsupported {
        format: ReportFormat,
        reason: String,
    },

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render a report of `run`.
    fn generate(&self, run: &RunResult, metadata: &ReportMetadata) -> Result<String, ReportError>;

    /// Write report to a writer
    fn write_report(
        &self,
        run: &RunResult,
        metadata: &ReportMetadata,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let report = self.generate(run, metadata)?;
        writer.write_all(report.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Summary => Box::new(SummaryReporter::new()),
        ReportFormat::Json => Box::new(JsonReporter::new()),
        ReportFormat::Csv => Box::new(CsvReporter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_reporter_formats() {
        for format in [ReportFormat::Summary, ReportFormat::Json, ReportFormat::Csv] {
            assert_eq!(create_reporter(format).format(), format);
        }
    }
}
