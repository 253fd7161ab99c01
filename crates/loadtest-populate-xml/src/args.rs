//! CLI argument definitions for the XML populator.

use clap::Args;
use std::path::PathBuf;

/// Arguments shared by workload-driven populate commands.
#[derive(Args, Clone, Debug)]
pub struct CommonPopulateArgs {
    /// Path to workload YAML file
    #[arg(long, short = 'w')]
    pub workload: PathBuf,

    /// Number of cycles to run
    #[arg(long, default_value = "1000")]
    pub cycles: u64,

    /// First cycle number (for resuming or extending a previous run)
    #[arg(long, default_value = "0")]
    pub start_cycle: u64,

    /// Number of parallel workers
    #[arg(long, default_value = "4")]
    pub threads: usize,

    /// Random seed for deterministic generation (defaults to the workload seed, then 42)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Dry-run mode: load the workload and resolve a few cycles without writing files
    #[arg(long)]
    pub dry_run: bool,
}

/// XML-specific populate arguments.
#[derive(Args, Clone, Debug)]
pub struct XmlPopulateArgs {
    /// Output directory for XML files (cleaned before the run)
    #[arg(long, short = 'o')]
    pub output_dir: PathBuf,

    /// Root element name (overrides the workload's `root`)
    #[arg(long)]
    pub root: Option<String>,

    #[command(flatten)]
    pub common: CommonPopulateArgs,
}
