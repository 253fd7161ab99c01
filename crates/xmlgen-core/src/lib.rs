//! Streaming, templated XML document generation for xmlgen load testing.
//!
//! This crate turns per-cycle element requests into incrementally written
//! XML files. Each request names a file index, a path of element names
//! below the document root, and an [`ElementTemplate`] describing the
//! attributes, children and body of the element at the end of that path.
//!
//! # Architecture
//!
//! ```text
//! XmlGenSpace
//!      │ create_document_set (once per session)
//!      ▼
//! ┌───────────────────┐      ┌──────────────────┐
//! │    DocumentSet    │─────▶│ SerializerEngine │ (shared, lazily created)
//! │ index -> builder  │      └──────────────────┘
//! └─────────┬─────────┘
//!           │ get_or_create_builder(index)
//!           ▼
//! ┌───────────────────┐
//! │  DocumentBuilder  │  one mutex per document
//! │  - cursor         │
//! │  - PathTree       │──▶ ElementSink (XmlStreamWriter -> xml<index>.xml)
//! └───────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use xmlgen_core::{DocumentSet, ElementTemplate, SerializerEngine};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let set = DocumentSet::create(dir.path().join("out"), "people", SerializerEngine::shared())
//!     .unwrap();
//!
//! let template = ElementTemplate::new(Default::default(), Default::default(), "Ada");
//! set.emit(0, &["person".to_string()], &template).unwrap();
//! set.close().unwrap();
//! ```
//!
//! # Content maps
//!
//! Content is described with [`ContentValue`] trees. Inside a map the keys
//! `children`, `attrs`, `body` and `foreach` are structural (see
//! [`Keyword`]); every other key names a child element.

pub mod builder;
pub mod content;
pub mod document_set;
pub mod error;
pub mod keyword;
pub mod path_tree;
pub mod sink;
pub mod space;
pub mod template;
pub mod testing;

// Re-exports for convenience
pub use builder::{BuilderStatus, DocumentBuilder};
pub use content::{ContentSpec, ContentValue};
pub use document_set::{DocumentSet, FileDocument};
pub use error::{CloseFailure, XmlGenError};
pub use keyword::Keyword;
pub use path_tree::{divergence_index, PathTree};
pub use sink::{ElementId, ElementSink, EngineConfig, SerializerEngine, XmlStreamWriter};
pub use space::XmlGenSpace;
pub use template::{ElementTemplate, Foreach, ResolvedElement, Substitution};

/// Result alias used throughout the crate.
pub type Result<T, E = XmlGenError> = std::result::Result<T, E>;
