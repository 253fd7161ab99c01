//! Populate command runner.

use anyhow::Context;
use loadtest_populate_xml::{PopulateMetrics, Workload, XmlPopulateArgs, XmlPopulator};
use std::path::PathBuf;
use xmlgen_core::{DocumentSet, XmlGenSpace};

use super::output::{summarize_output, OutputSummary};

/// Seed used when neither `--seed` nor the workload sets one.
pub const DEFAULT_SEED: u64 = 42;

/// Number of cycles resolved and logged by `--dry-run`.
pub const DRY_RUN_CYCLES: u64 = 5;

/// Outcome of a successful populate run.
#[derive(Debug, Clone)]
pub struct PopulateReport {
    pub seed: u64,
    pub root: String,
    pub output_dir: PathBuf,
    /// `None` for a dry run.
    pub metrics: Option<PopulateMetrics>,
    pub output: OutputSummary,
}

/// Run populate command to write XML documents from a workload
pub async fn run_populate(args: XmlPopulateArgs) -> anyhow::Result<PopulateReport> {
    let workload = Workload::from_file(&args.common.workload).with_context(|| {
        format!("Failed to load workload from {:?}", args.common.workload)
    })?;

    if args.common.threads == 0 {
        anyhow::bail!("--threads must be at least 1");
    }

    let seed = args.common.seed.or(workload.seed()).unwrap_or(DEFAULT_SEED);
    let root = args.root.clone().unwrap_or_else(|| workload.root().to_string());
    let populator = XmlPopulator::new(workload, seed).with_start_cycle(args.common.start_cycle);

    if args.common.dry_run {
        tracing::info!(
            "[DRY-RUN] Would populate {} cycle(s) from cycle {} into {:?} with root '{}' (seed={}, threads={})",
            args.common.cycles,
            args.common.start_cycle,
            args.output_dir,
            root,
            seed,
            args.common.threads
        );
        tracing::info!(
            "[DRY-RUN] Workload has {} op(s) over {} default file(s)",
            populator.workload().ops().len(),
            populator.workload().files()
        );
        let ops = populator
            .dry_run(args.common.cycles.min(DRY_RUN_CYCLES))
            .context("Failed to resolve workload cycles")?;
        for op in &ops {
            tracing::info!(
                "[DRY-RUN] cycle {} ({}): {} {:?} -> {}",
                op.cycle,
                op.op_name,
                op.command,
                op.path,
                DocumentSet::file_name(op.file_index)
            );
        }
        tracing::info!("[DRY-RUN] Workload validated successfully");

        return Ok(PopulateReport {
            seed,
            root,
            output_dir: args.output_dir,
            metrics: None,
            output: OutputSummary::default(),
        });
    }

    tracing::info!(
        "Populating {:?} with {} cycle(s) (seed={}, root='{}')",
        args.output_dir,
        args.common.cycles,
        seed,
        root
    );

    let space = XmlGenSpace::new("populate");
    let set = space
        .create_document_set(&args.output_dir, &root)
        .with_context(|| format!("Failed to prepare output directory {:?}", args.output_dir))?;

    let metrics = match populator
        .populate(set, args.common.cycles, args.common.threads)
        .await
    {
        Ok(metrics) => metrics,
        Err(e) => {
            // Close what was written so far before reporting the failure
            if let Err(close_err) = space.close() {
                tracing::error!("Failed to close documents: {}", close_err);
                return Err(anyhow::Error::new(e)
                    .context(format!("Populate failed; documents did not close either: {close_err}")));
            }
            return Err(anyhow::Error::new(e).context("Populate failed"));
        }
    };

    for message in &metrics.failure_messages {
        tracing::error!("{}", message);
    }
    let close_result = space.close();
    if let Err(e) = &close_result {
        tracing::error!("Failed to close documents: {}", e);
    }

    let output = summarize_output(&args.output_dir)
        .with_context(|| format!("Failed to read output directory {:?}", args.output_dir))?;
    tracing::info!(
        "Wrote {} file(s), {} bytes: {} op(s) in {:?} ({:.2} ops/sec)",
        output.files,
        output.bytes,
        metrics.ops_emitted,
        metrics.total_duration,
        metrics.ops_per_second()
    );

    // Fail if there were any errors
    if metrics.failures > 0 {
        anyhow::bail!("Populate failed with {} failed cycle(s)", metrics.failures);
    }
    close_result.context("Populate failed: documents did not close cleanly")?;

    Ok(PopulateReport {
        seed,
        root,
        output_dir: args.output_dir,
        metrics: Some(metrics),
        output,
    })
}
