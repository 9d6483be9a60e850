//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler validates its configuration, runs the pipeline stages it
//! needs and writes the report.

mod grade;
mod link;
mod rank;

pub use grade::run_grade;
pub use link::run_link;
pub use rank::run_rank;

use crate::config::{AppConfig, Validatable};
use crate::pipeline::PipelineInputs;
use crate::reports::ReportMetadata;
use anyhow::{Result, bail};

/// Reject a configuration that fails validation, listing every problem.
pub fn ensure_valid(config: &AppConfig) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    let listing: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
    bail!("invalid configuration:\n{}", listing.join("\n"));
}

fn metadata(command: &str, inputs: &PipelineInputs) -> ReportMetadata {
    ReportMetadata {
        command: command.to_string(),
        reference_path: Some(inputs.reference.display().to_string()),
        retailer_paths: inputs
            .retailers
            .iter()
            .map(|feed| format!("{} ({}): {}", feed.id, feed.country, feed.path.display()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RetailerFeed;
    use std::path::PathBuf;

    #[test]
    fn test_ensure_valid_lists_every_error() {
        assert!(ensure_valid(&AppConfig::default()).is_ok());

        let config = AppConfig::builder().link_threshold(150.0).draws(0).build();
        let message = ensure_valid(&config).unwrap_err().to_string();
        assert!(message.contains("linking.threshold"));
        assert!(message.contains("sensitivity.draws"));
    }

    #[test]
    fn test_metadata_describes_feeds() {
        let inputs = PipelineInputs {
            reference: PathBuf::from("off.jsonl"),
            retailers: vec!["ah:nl:ah.json".parse::<RetailerFeed>().unwrap()],
        };
        let meta = metadata("link", &inputs);
        assert_eq!(meta.command, "link");
        assert_eq!(meta.reference_path.as_deref(), Some("off.jsonl"));
        assert_eq!(meta.retailer_paths, vec!["ah (nl): ah.json".to_string()]);
    }
}
