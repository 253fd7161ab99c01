//! Dry-run mode and argument parsing.

use crate::common::{populate_args, LIBRARY_WORKLOAD};
use clap::Parser;
use loadtest_populate_xml::XmlPopulateArgs;
use tempfile::TempDir;
use xmlgen::loadtest::populate::{run_populate, DEFAULT_SEED};

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    args: XmlPopulateArgs,
}

#[test]
fn test_populate_args_defaults() {
    let cli = TestCli::try_parse_from(["xmlgen", "-w", "workload.yaml", "-o", "out"]).unwrap();

    assert_eq!(cli.args.common.workload.to_str(), Some("workload.yaml"));
    assert_eq!(cli.args.output_dir.to_str(), Some("out"));
    assert_eq!(cli.args.root, None);
    assert_eq!(cli.args.common.cycles, 1000);
    assert_eq!(cli.args.common.start_cycle, 0);
    assert_eq!(cli.args.common.threads, 4);
    assert_eq!(cli.args.common.seed, None);
    assert!(!cli.args.common.dry_run);
}

#[test]
fn test_populate_args_overrides() {
    let cli = TestCli::try_parse_from([
        "xmlgen",
        "--workload",
        "w.yaml",
        "--output-dir",
        "o",
        "--root",
        "catalog",
        "--cycles",
        "10",
        "--start-cycle",
        "5",
        "--threads",
        "2",
        "--seed",
        "7",
        "--dry-run",
    ])
    .unwrap();

    assert_eq!(cli.args.root.as_deref(), Some("catalog"));
    assert_eq!(cli.args.common.cycles, 10);
    assert_eq!(cli.args.common.start_cycle, 5);
    assert_eq!(cli.args.common.threads, 2);
    assert_eq!(cli.args.common.seed, Some(7));
    assert!(cli.args.common.dry_run);
}

#[test]
fn test_workload_and_output_are_required() {
    assert!(TestCli::try_parse_from(["xmlgen", "-o", "out"]).is_err());
    assert!(TestCli::try_parse_from(["xmlgen", "-w", "workload.yaml"]).is_err());
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out");
    let mut args = populate_args(LIBRARY_WORKLOAD, &output_dir, 1000, 4);
    args.common.dry_run = true;

    let report = run_populate(args).await.expect("dry run failed");

    assert!(report.metrics.is_none());
    assert_eq!(report.output.files, 0);
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_dry_run_rejects_missing_workload() {
    let temp_dir = TempDir::new().unwrap();
    let mut args = populate_args("tests/fixtures/missing.yaml", temp_dir.path(), 10, 1);
    args.common.dry_run = true;

    let err = run_populate(args).await.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to load workload"));
}

#[tokio::test]
async fn test_default_seed_without_workload_seed() {
    let temp_dir = TempDir::new().unwrap();
    let mut args = populate_args(
        crate::common::BROKEN_NAMES_WORKLOAD,
        &temp_dir.path().join("out"),
        1,
        1,
    );
    args.common.dry_run = true;

    let report = run_populate(args).await.expect("dry run failed");
    assert_eq!(report.seed, DEFAULT_SEED);
    assert_eq!(report.root, "root");
}
