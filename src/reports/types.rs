//! Report type definitions.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Aligned text table with diagnostics
    #[default]
    Summary,
    /// Ranking and diagnostics as structured JSON
    Json,
    /// One row per ranked category
    Csv,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Default)]
pub struct ReportMetadata {
    /// Subcommand that produced the run
    pub command: String,
    pub reference_path: Option<String>,
    pub retailer_paths: Vec<String>,
}
