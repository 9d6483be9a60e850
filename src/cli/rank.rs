//! Rank command handler.
//!
//! Implements the `rank` subcommand: the full pipeline from raw tables to a
//! scored category ranking.

use super::{ensure_valid, metadata};
use crate::config::AppConfig;
use crate::pipeline::{PipelineInputs, exit_codes, output_report, run};
use anyhow::{Context, Result};

/// Run the rank command, returning the desired exit code.
pub fn run_rank(config: &AppConfig, inputs: &PipelineInputs, quiet: bool) -> Result<i32> {
    ensure_valid(config)?;

    tracing::info!(
        retailers = inputs.retailers.len(),
        threshold = config.linking.threshold,
        sensitivity = config.sensitivity.enabled,
        "Ranking categories"
    );
    let result = run(inputs, config).context("pipeline run failed")?;

    if result.ranking.is_empty() {
        tracing::warn!("No category met the ranking criteria");
    } else if let Some(top) = result.ranking.first() {
        tracing::info!(
            categories = result.ranking.len(),
            "Top opportunity: {} (score {:.3})",
            top.key,
            top.score
        );
    }

    output_report(&config.output, &result, &metadata("rank", inputs), quiet)?;
    Ok(exit_codes::SUCCESS)
}
