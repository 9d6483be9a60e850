//! Pipeline orchestration.
//!
//! Shared load → normalize → grade → link → join → metrics → score logic for
//! the CLI command handlers, plus output handling.

mod ingest;
mod output;
mod report_stage;
mod run;

pub use ingest::{
    InputFormat, REFERENCE_REQUIRED, RETAILER_REQUIRED, RetailerFeed, check_columns,
    load_reference, load_retailer, parse_rows, read_rows, reference_records, retailer_records,
};
pub use output::{OutputTarget, should_use_color, write_enriched, write_output};
pub use report_stage::output_report;
pub use run::{
    CleanTables, Diagnostics, PipelineInputs, RawTables, RetailerTable, RunResult, RunSettings,
    grade_only, grade_stage, join_stage, link_only, link_stage, normalize_stage, run, run_tables,
};

/// Exit codes for scripted use
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::ERROR, 3);
    }
}
