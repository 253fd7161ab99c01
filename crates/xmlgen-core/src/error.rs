//! Error types for XML generation.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating XML documents.
#[derive(Error, Debug)]
pub enum XmlGenError {
    // ------------------------------------------------------------------
    // Configuration errors: fatal to one call, the document stays usable
    // ------------------------------------------------------------------
    /// A `foreach` entry is not `[placeholder, [items...]]`.
    #[error("Malformed foreach {value}: {reason}")]
    MalformedForeach { value: String, reason: &'static str },

    /// A structural entry has the wrong shape.
    #[error("Invalid content for '{field}': {message}")]
    InvalidContent { field: String, message: String },

    /// A child name is declared both as a plain key and inside `children`.
    #[error("Child '{0}' is declared both inline and in 'children'")]
    DuplicateChild(String),

    /// An element path with no names.
    #[error("Element path is empty")]
    EmptyPath,

    // ------------------------------------------------------------------
    // Structural errors: fatal to the owning document
    // ------------------------------------------------------------------
    /// An element or attribute name rejected by the serializer.
    #[error("Invalid XML name: '{0}'")]
    InvalidName(String),

    /// A serializer primitive called out of streaming order.
    #[error("Out of order write: {0}")]
    OutOfOrder(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML writer error.
    #[error("XML writer error: {0}")]
    Xml(#[from] quick_xml::Error),

    // ------------------------------------------------------------------
    // Session and lifecycle errors
    // ------------------------------------------------------------------
    /// The output directory could not be prepared.
    #[error("Output directory {path:?}: {message}")]
    OutputDirectory { path: PathBuf, message: String },

    /// The backing file of a new document already exists.
    #[error("Output file already exists: {0:?}")]
    FileExists(PathBuf),

    /// A previous structural error left the document unusable.
    #[error("Document is unusable after an earlier failure: {0}")]
    DocumentUnusable(String),

    /// The document has already been closed.
    #[error("Document is closed")]
    DocumentClosed,

    /// The document set has already been closed.
    #[error("Document set is closed")]
    DocumentSetClosed,

    /// A lock was poisoned by a panicking thread.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// One or more documents failed to close.
    #[error("{} document(s) failed to close: {}", .0.len(), CloseFailures(.0))]
    CloseFailed(Vec<CloseFailure>),
}

impl XmlGenError {
    /// Whether this error came from the content description rather than the
    /// output document.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            XmlGenError::MalformedForeach { .. }
                | XmlGenError::InvalidContent { .. }
                | XmlGenError::DuplicateChild(_)
                | XmlGenError::EmptyPath
        )
    }

    /// Whether this error leaves the document that raised it unusable.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            XmlGenError::InvalidName(_)
                | XmlGenError::OutOfOrder(_)
                | XmlGenError::Io(_)
                | XmlGenError::Xml(_)
        )
    }

    pub(crate) fn invalid_content(field: impl Into<String>, message: impl Into<String>) -> Self {
        XmlGenError::InvalidContent {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A document that failed to close, by file index.
#[derive(Debug)]
pub struct CloseFailure {
    pub file_index: u64,
    pub error: XmlGenError,
}

impl fmt::Display for CloseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {}: {}", self.file_index, self.error)
    }
}

struct CloseFailures<'a>(&'a [CloseFailure]);

impl fmt::Display for CloseFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
