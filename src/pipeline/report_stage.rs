//! Report output stage.

use super::{OutputTarget, RunResult, should_use_color, write_enriched, write_output};
use crate::config::OutputConfig;
use crate::reports::{ReportFormat, ReportGenerator, ReportMetadata, SummaryReporter, create_reporter};
use anyhow::Result;

/// Render `run` in the configured format and write it, plus the enriched
/// table when a path for it is configured.
pub fn output_report(
    output: &OutputConfig,
    run: &RunResult,
    metadata: &ReportMetadata,
    quiet: bool,
) -> Result<()> {
    let target = OutputTarget::from_option(output.file.clone());

    let reporter: Box<dyn ReportGenerator> = match output.format {
        ReportFormat::Summary if !should_use_color(&target) => {
            Box::new(SummaryReporter::new().no_color())
        }
        format => create_reporter(format),
    };
    let report = reporter.generate(run, metadata)?;
    write_output(&report, &target, quiet)?;

    if let Some(path) = &output.enriched_file {
        write_enriched(&run.enriched, path)?;
    }
    Ok(())
}
