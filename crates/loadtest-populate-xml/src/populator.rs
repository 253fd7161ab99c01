//! Multi-worker workload execution against a document set.

use crate::error::XmlPopulatorError;
use crate::op::ElementOp;
use crate::workload::Workload;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use xmlgen_core::DocumentSet;

/// Number of failure messages kept in [`PopulateMetrics`].
pub const MAX_FAILURE_MESSAGES: usize = 10;

/// Metrics from a populate operation.
#[derive(Debug, Clone, Default)]
pub struct PopulateMetrics {
    /// Number of cycles run.
    pub cycles_attempted: u64,
    /// Number of ops successfully written.
    pub ops_emitted: u64,
    /// Number of cycles that failed.
    pub failures: u64,
    /// The first failures, as messages.
    pub failure_messages: Vec<String>,
    /// Total time taken.
    pub total_duration: Duration,
}

impl PopulateMetrics {
    /// Calculate ops per second.
    pub fn ops_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.ops_emitted as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate cycles per second.
    pub fn cycles_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.cycles_attempted as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    fn record_failure(&mut self, message: String) {
        self.failures += 1;
        if self.failure_messages.len() < MAX_FAILURE_MESSAGES {
            self.failure_messages.push(message);
        }
    }

    fn merge(&mut self, other: PopulateMetrics) {
        self.cycles_attempted += other.cycles_attempted;
        self.ops_emitted += other.ops_emitted;
        self.failures += other.failures;
        let room = MAX_FAILURE_MESSAGES.saturating_sub(self.failure_messages.len());
        self.failure_messages
            .extend(other.failure_messages.into_iter().take(room));
    }
}

/// Runs a workload's ops against a [`DocumentSet`].
pub struct XmlPopulator {
    workload: Arc<Workload>,
    seed: u64,
    start_cycle: u64,
}

impl XmlPopulator {
    /// Create a populator.
    ///
    /// # Arguments
    ///
    /// * `workload` - Op templates to cycle through
    /// * `seed` - Random seed for deterministic pattern resolution
    pub fn new(workload: Workload, seed: u64) -> Self {
        Self {
            workload: Arc::new(workload),
            seed,
            start_cycle: 0,
        }
    }

    /// Set the first cycle number (for extending a previous run).
    pub fn with_start_cycle(mut self, cycle: u64) -> Self {
        self.start_cycle = cycle;
        self
    }

    pub fn workload(&self) -> &Workload {
        &self.workload
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn start_cycle(&self) -> u64 {
        self.start_cycle
    }

    /// Resolve the op for `cycle` without writing anything.
    pub fn resolve(&self, cycle: u64) -> Result<ElementOp, XmlPopulatorError> {
        ElementOp::resolve(&self.workload, self.seed, cycle)
    }

    /// Resolve the first `count` cycles without writing anything.
    pub fn dry_run(&self, count: u64) -> Result<Vec<ElementOp>, XmlPopulatorError> {
        (self.start_cycle..self.start_cycle.saturating_add(count))
            .map(|cycle| self.resolve(cycle))
            .collect()
    }

    /// Run `cycles` cycles on `threads` blocking workers.
    ///
    /// Worker `w` runs cycles `start + w`, `start + w + threads`, and so on.
    /// A failing cycle is logged and counted; it does not stop the run.
    /// The document set is left open.
    pub async fn populate(
        &self,
        set: Arc<DocumentSet>,
        cycles: u64,
        threads: usize,
    ) -> Result<PopulateMetrics, XmlPopulatorError> {
        if threads == 0 {
            return Err(XmlPopulatorError::InvalidArgument(
                "threads must be at least 1".to_string(),
            ));
        }
        let start_time = Instant::now();
        let start = self.start_cycle;
        let end = start.saturating_add(cycles);

        info!(
            "Populating {} cycle(s) from cycle {} with {} worker(s) into {}",
            cycles,
            start,
            threads,
            set.directory().display()
        );

        let handles: Vec<_> = (0..threads as u64)
            .map(|worker| {
                let workload = Arc::clone(&self.workload);
                let set = Arc::clone(&set);
                let seed = self.seed;
                // A worker whose first cycle is past u64::MAX has nothing to run
                let first = start.checked_add(worker).unwrap_or(end);
                tokio::task::spawn_blocking(move || {
                    run_worker(&workload, &set, seed, worker, first, end, threads as u64)
                })
            })
            .collect();

        let mut metrics = PopulateMetrics::default();
        for joined in futures::future::join_all(handles).await {
            let worker_metrics = joined.map_err(|e| XmlPopulatorError::Worker(e.to_string()))?;
            metrics.merge(worker_metrics);
        }
        metrics.total_duration = start_time.elapsed();

        info!(
            "Populate complete: {} op(s) from {} cycle(s), {} failure(s) in {:?} ({:.2} ops/sec)",
            metrics.ops_emitted,
            metrics.cycles_attempted,
            metrics.failures,
            metrics.total_duration,
            metrics.ops_per_second()
        );
        Ok(metrics)
    }
}

fn run_worker(
    workload: &Workload,
    set: &DocumentSet,
    seed: u64,
    worker: u64,
    first: u64,
    end: u64,
    step: u64,
) -> PopulateMetrics {
    let mut metrics = PopulateMetrics::default();
    let mut cycle = first;
    while cycle < end {
        metrics.cycles_attempted += 1;
        let result = ElementOp::resolve(workload, seed, cycle)
            .and_then(|op| op.apply(set).map_err(XmlPopulatorError::from));
        match result {
            Ok(()) => metrics.ops_emitted += 1,
            Err(e) => {
                warn!("Worker {}: cycle {} failed: {}", worker, cycle, e);
                metrics.record_failure(format!("cycle {cycle}: {e}"));
            }
        }

        if metrics.cycles_attempted % 10000 == 0 {
            debug!("Worker {}: {} cycle(s) run", worker, metrics.cycles_attempted);
        }
        cycle = match cycle.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    debug!(
        "Worker {} finished: {} op(s), {} failure(s)",
        worker, metrics.ops_emitted, metrics.failures
    );
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use xmlgen_core::SerializerEngine;

    fn populator(yaml: &str) -> XmlPopulator {
        XmlPopulator::new(Workload::from_yaml(yaml).unwrap(), 42)
    }

    fn document_set(dir: &TempDir) -> Arc<DocumentSet> {
        Arc::new(DocumentSet::create(dir.path(), "root", SerializerEngine::shared()).unwrap())
    }

    #[tokio::test]
    async fn test_populate_spreads_cycles_over_files() {
        let dir = TempDir::new().unwrap();
        let set = document_set(&dir);
        let populator = populator("files: 3\nops: [{ path: [items, item], body: \"{index}\" }]");

        let metrics = populator.populate(Arc::clone(&set), 30, 4).await.unwrap();
        set.close().unwrap();

        assert_eq!(metrics.cycles_attempted, 30);
        assert_eq!(metrics.ops_emitted, 30);
        assert_eq!(metrics.failures, 0);
        for index in 0..3 {
            let xml = std::fs::read_to_string(set.file_path(index)).unwrap();
            assert_eq!(xml.matches("<item>").count(), 10);
        }
    }

    #[tokio::test]
    async fn test_populate_counts_failures() {
        let dir = TempDir::new().unwrap();
        let set = document_set(&dir);
        let populator = populator(
            r#"
ops:
  - path: [ok]
  - path: ["bad{index} name"]
"#,
        );

        let metrics = populator.populate(Arc::clone(&set), 6, 2).await.unwrap();

        assert_eq!(metrics.cycles_attempted, 6);
        // The first bad name makes document 0 unusable for later cycles.
        assert_eq!(metrics.ops_emitted + metrics.failures, 6);
        assert!(metrics.failures >= 3);
        assert!(!metrics.failure_messages.is_empty());
        assert!(set.close().is_err());
    }

    #[tokio::test]
    async fn test_populate_honours_start_cycle() {
        let dir = TempDir::new().unwrap();
        let set = document_set(&dir);
        let populator = populator("ops: [{ path: [n], body: \"{index}\" }]").with_start_cycle(100);

        let metrics = populator.populate(Arc::clone(&set), 3, 1).await.unwrap();
        set.close().unwrap();

        assert_eq!(metrics.ops_emitted, 3);
        let xml = std::fs::read_to_string(set.file_path(0)).unwrap();
        assert!(xml.ends_with("<root><n>100</n><n>101</n><n>102</n></root>"));
    }

    #[tokio::test]
    async fn test_zero_threads_is_rejected() {
        let dir = TempDir::new().unwrap();
        let set = document_set(&dir);
        let result = populator("ops: [{ path: [n] }]").populate(set, 1, 0).await;
        assert!(matches!(result, Err(XmlPopulatorError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_start_cycle_near_u64_max() {
        let dir = TempDir::new().unwrap();
        let set = document_set(&dir);

        let metrics = populator("ops: [{ path: [n], body: \"{index}\" }]")
            .with_start_cycle(u64::MAX)
            .populate(Arc::clone(&set), 1, 2)
            .await
            .unwrap();
        assert_eq!(metrics.cycles_attempted, 0);

        let metrics = populator("ops: [{ path: [n], body: \"{index}\" }]")
            .with_start_cycle(u64::MAX - 1)
            .populate(Arc::clone(&set), 5, 3)
            .await
            .unwrap();
        set.close().unwrap();

        // The range ends at u64::MAX, so only one cycle remains.
        assert_eq!(metrics.cycles_attempted, 1);
        assert_eq!(metrics.ops_emitted, 1);
        let xml = std::fs::read_to_string(set.file_path(0)).unwrap();
        assert!(xml.ends_with(&format!("<root><n>{}</n></root>", u64::MAX - 1)));
    }

    #[test]
    fn test_dry_run_resolves_without_writing() {
        let populator = populator("files: 2\nops: [{ path: [n], body: \"{index}\" }]")
            .with_start_cycle(5);

        let ops = populator.dry_run(3).unwrap();

        assert_eq!(ops.iter().map(|op| op.cycle).collect::<Vec<_>>(), vec![5, 6, 7]);
        assert_eq!(ops.iter().map(|op| op.file_index).collect::<Vec<_>>(), vec![1, 0, 1]);
        assert_eq!(ops[0].template.body(), "5");
    }

    #[test]
    fn test_metrics_keep_first_failures() {
        let mut metrics = PopulateMetrics::default();
        for i in 0..(MAX_FAILURE_MESSAGES + 5) {
            metrics.record_failure(format!("failure {i}"));
        }
        assert_eq!(metrics.failures, (MAX_FAILURE_MESSAGES + 5) as u64);
        assert_eq!(metrics.failure_messages.len(), MAX_FAILURE_MESSAGES);
        assert_eq!(metrics.failure_messages[0], "failure 0");
    }
}
