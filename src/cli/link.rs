//! Link command handler.

use super::{ensure_valid, metadata};
use crate::config::AppConfig;
use crate::pipeline::{PipelineInputs, exit_codes, link_only, output_report};
use anyhow::{Context, Result};

/// Run the link command, returning the desired exit code.
///
/// Prints per-feed link reports; the joined table goes to the enriched
/// output file when one is configured.
pub fn run_link(config: &AppConfig, inputs: &PipelineInputs, quiet: bool) -> Result<i32> {
    ensure_valid(config)?;

    let result = link_only(inputs, config).context("linking failed")?;
    output_report(&config.output, &result, &metadata("link", inputs), quiet)?;
    Ok(exit_codes::SUCCESS)
}
