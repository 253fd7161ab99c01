//! End-to-end populate runs against a temporary output directory.

use crate::common::{parse_document, populate_args, BROKEN_NAMES_WORKLOAD, LIBRARY_WORKLOAD};
use tempfile::TempDir;
use xmlgen::loadtest::populate::run_populate;
use xmlgen_core::DocumentSet;

const CYCLES: u64 = 120; // 40 cycles per op
const THREADS: usize = 4;

#[tokio::test]
async fn test_library_workload_produces_well_formed_documents() {
    tracing_subscriber::fmt()
        .with_env_filter("xmlgen=info,loadtest_populate_xml=info,xmlgen_core=info")
        .try_init()
        .ok();

    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out");
    let report = run_populate(populate_args(LIBRARY_WORKLOAD, &output_dir, CYCLES, THREADS))
        .await
        .expect("populate failed");

    let metrics = report.metrics.expect("metrics for a real run");
    assert_eq!(report.seed, 11);
    assert_eq!(report.root, "library");
    assert_eq!(metrics.cycles_attempted, CYCLES);
    assert_eq!(metrics.ops_emitted, CYCLES);
    assert_eq!(metrics.failures, 0);
    assert_eq!(report.output.files, 4);
    assert!(report.output.bytes > 0);

    let mut totals = std::collections::HashMap::<&str, usize>::new();
    for index in 0..4 {
        let stats = parse_document(&output_dir.join(DocumentSet::file_name(index)));
        assert_eq!(stats.root.as_deref(), Some("library"));
        assert_eq!(stats.count("library"), 1);
        for name in ["title", "chapter", "heading", "loan", "entry"] {
            *totals.entry(name).or_insert(0) += stats.count(name);
        }
    }

    assert_eq!(totals["title"], 40);
    assert_eq!(totals["chapter"], 120);
    assert_eq!(totals["heading"], 120);
    assert_eq!(totals["loan"], 40);
    assert_eq!(totals["entry"], 40);

    // Audit entries are pinned to the first file.
    assert_eq!(parse_document(&output_dir.join("xml0.xml")).count("entry"), 40);
}

#[tokio::test]
async fn test_single_worker_output_is_reproducible() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    for dir in [&first, &second] {
        run_populate(populate_args(LIBRARY_WORKLOAD, dir.path(), 30, 1))
            .await
            .expect("populate failed");
    }

    for index in 0..4 {
        let name = DocumentSet::file_name(index);
        let a = std::fs::read_to_string(first.path().join(&name)).unwrap();
        let b = std::fs::read_to_string(second.path().join(&name)).unwrap();
        assert_eq!(a, b, "{name} differs between identical runs");
    }
}

#[tokio::test]
async fn test_root_and_seed_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let mut args = populate_args(LIBRARY_WORKLOAD, temp_dir.path(), 6, 2);
    args.root = Some("catalog".to_string());
    args.common.seed = Some(99);
    args.common.start_cycle = 300;

    let report = run_populate(args).await.expect("populate failed");

    assert_eq!(report.seed, 99);
    assert_eq!(report.root, "catalog");
    let stats = parse_document(&temp_dir.path().join("xml0.xml"));
    assert_eq!(stats.root.as_deref(), Some("catalog"));
}

#[tokio::test]
async fn test_output_directory_is_cleaned() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("stale.xml"), "<old/>").unwrap();
    std::fs::write(temp_dir.path().join("xml0.xml"), "<old/>").unwrap();

    let report = run_populate(populate_args(LIBRARY_WORKLOAD, temp_dir.path(), 3, 1))
        .await
        .expect("populate failed");

    assert!(!temp_dir.path().join("stale.xml").exists());
    // Cycles 0 and 2 write to xml0.xml, cycle 1 to xml1.xml.
    assert_eq!(report.output.files, 2);
}

#[tokio::test]
async fn test_failed_cycles_fail_the_run() {
    let temp_dir = TempDir::new().unwrap();

    let err = run_populate(populate_args(BROKEN_NAMES_WORKLOAD, temp_dir.path(), 10, 2))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("failed cycle(s)"), "{err:#}");
}

#[tokio::test]
async fn test_output_path_that_is_a_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("not-a-dir");
    std::fs::write(&output, "x").unwrap();

    let err = run_populate(populate_args(LIBRARY_WORKLOAD, &output, 3, 1))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("Failed to prepare output directory"));
}

#[tokio::test]
async fn test_zero_threads_leaves_output_directory_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let precious = temp_dir.path().join("precious.txt");
    std::fs::write(&precious, "keep me").unwrap();

    let err = run_populate(populate_args(LIBRARY_WORKLOAD, temp_dir.path(), 10, 0))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("--threads must be at least 1"), "{err:#}");
    assert_eq!(std::fs::read_to_string(&precious).unwrap(), "keep me");
}

#[tokio::test]
async fn test_zero_threads_is_rejected_in_dry_run() {
    let temp_dir = TempDir::new().unwrap();
    let mut args = populate_args(LIBRARY_WORKLOAD, temp_dir.path(), 10, 0);
    args.common.dry_run = true;

    assert!(run_populate(args).await.is_err());
}
