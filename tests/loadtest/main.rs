//! Load testing integration tests.
//!
//! These tests run the populate command handler against the workloads in
//! `tests/fixtures` and check the generated documents:
//! 1. Load the workload and prepare a temporary output directory
//! 2. Run the workload on several workers
//! 3. Parse every produced file and compare element counts with the cycles run

mod common;
mod dry_run;
mod populate_xml;
