//! Error types for the XML populator.

use std::path::PathBuf;
use thiserror::Error;
use xmlgen_core::XmlGenError;

/// Errors that can occur while loading a workload or populating documents.
#[derive(Error, Debug)]
pub enum XmlPopulatorError {
    /// The workload file could not be read.
    #[error("Failed to read workload {path}: {source}")]
    WorkloadIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The workload is not valid YAML for the expected shape.
    #[error("Failed to parse workload YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The workload parsed but describes an unusable run.
    #[error("Invalid workload: {0}")]
    Workload(String),

    /// A resolved `file` pattern is not a file index.
    #[error("Cycle {cycle}: file pattern resolved to '{value}', expected an unsigned integer")]
    FileIndex { cycle: u64, value: String },

    /// Invalid run parameters.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Document generation error.
    #[error(transparent)]
    Document(#[from] XmlGenError),

    /// A worker task panicked or was cancelled.
    #[error("Worker failed: {0}")]
    Worker(String),
}
