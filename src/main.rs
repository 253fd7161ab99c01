//! Command-line interface for xmlgen
//!
//! # Usage Examples
//!
//! ## Populate
//! ```bash
//! # Run 1000 cycles of a workload on 4 workers
//! xmlgen populate \
//!   --workload workload.yaml \
//!   --output-dir ./out
//!
//! # Extend a previous run with a different root element and seed
//! xmlgen populate \
//!   --workload workload.yaml \
//!   --output-dir ./out \
//!   --root catalog \
//!   --start-cycle 1000 --cycles 5000 \
//!   --threads 8 --seed 7
//!
//! # Validate a workload and print the first resolved cycles
//! xmlgen populate -w workload.yaml -o ./out --dry-run
//! ```
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=xmlgen=info,xmlgen_core=debug`.

use clap::{Parser, Subcommand};
use loadtest_populate_xml::XmlPopulateArgs;

#[derive(Parser)]
#[command(name = "xmlgen")]
#[command(about = "Templated, streaming XML data generator for load testing")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workload and write XML documents to an output directory
    Populate {
        #[command(flatten)]
        args: XmlPopulateArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Populate { args } => {
            xmlgen::loadtest::populate::run_populate(args).await?;
        }
    }

    Ok(())
}
