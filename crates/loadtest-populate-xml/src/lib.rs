//! Workload-driven XML populator for load testing.
//!
//! A workload is a YAML list of op templates. Each cycle picks one op,
//! resolves its pattern placeholders deterministically from the run seed and
//! the cycle number, and writes the resulting element into a
//! [`xmlgen_core::DocumentSet`].
//!
//! # Example
//!
//! ```ignore
//! use loadtest_populate_xml::{Workload, XmlPopulator};
//! use xmlgen_core::{DocumentSet, SerializerEngine};
//!
//! let workload = Workload::from_file("workload.yaml")?;
//! let set = Arc::new(DocumentSet::create("out", workload.root(), SerializerEngine::shared())?);
//! let populator = XmlPopulator::new(workload, 42);
//!
//! let metrics = populator.populate(set.clone(), 1000, 4).await?;
//! set.close()?;
//! println!("Wrote {} ops in {:?}", metrics.ops_emitted, metrics.total_duration);
//! ```

pub mod args;
pub mod error;
pub mod op;
pub mod pattern;
pub mod populator;
pub mod workload;

pub use args::{CommonPopulateArgs, XmlPopulateArgs};
pub use error::XmlPopulatorError;
pub use op::ElementOp;
pub use populator::{PopulateMetrics, XmlPopulator};
pub use workload::{Command, OpTemplate, Workload};
