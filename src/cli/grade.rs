//! Grade command handler.
//!
//! Implements the `grade` subcommand: normalizes a reference table, fills
//! missing Nutri-Score grades and reports coverage and cross-validation.

use super::ensure_valid;
use crate::config::AppConfig;
use crate::pipeline::{exit_codes, grade_only, output_report};
use crate::reports::ReportMetadata;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the grade command, returning the desired exit code.
pub fn run_grade(config: &AppConfig, input: &Path, quiet: bool) -> Result<i32> {
    ensure_valid(config)?;

    let result = grade_only(input, config)
        .with_context(|| format!("failed to grade {}", input.display()))?;

    let metadata = ReportMetadata {
        command: "grade".to_string(),
        reference_path: Some(input.display().to_string()),
        retailer_paths: Vec::new(),
    };
    output_report(&config.output, &result, &metadata, quiet)?;
    Ok(exit_codes::SUCCESS)
}
