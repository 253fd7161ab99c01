//! Populate command handler.

mod output;
mod run;

pub use output::{summarize_output, OutputSummary};
pub use run::{run_populate, PopulateReport, DEFAULT_SEED, DRY_RUN_CYCLES};
