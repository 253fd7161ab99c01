//! xmlgen Library
//!
//! Load-testing data generation that writes templated XML documents at high
//! call rates.
//!
//! # Features
//!
//! - Streaming output: elements are written as soon as they are final
//! - Shared prefixes: consecutive elements under the same path reuse the
//!   open parent elements
//! - Declarative content: attributes, nested children, text bodies and
//!   `foreach` repetition
//! - Parallel workers: many threads write to many files at once
//! - Deterministic runs: the same seed resolves every cycle the same way
//!
//! # Crates
//!
//! - `xmlgen_core` - document sets, builders, templates and the XML writer
//! - `loadtest_populate_xml` - workload files, pattern placeholders and the
//!   multi-worker populator
//!
//! # CLI Usage
//!
//! ```bash
//! # Write 10k cycles of the workload into ./out/xml<N>.xml
//! xmlgen populate --workload workload.yaml --output-dir out --cycles 10000
//!
//! # Check a workload without writing files
//! xmlgen populate -w workload.yaml -o out --dry-run
//! ```

pub mod loadtest;

pub use loadtest_populate_xml as populate;
pub use xmlgen_core as document;
