//! Per-session holder of the document set.

use crate::document_set::DocumentSet;
use crate::error::XmlGenError;
use crate::sink::SerializerEngine;
use crate::Result;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Named session owning at most one [`DocumentSet`].
///
/// Every op of a workload asks the space for the set; only the first call
/// creates it.
pub struct XmlGenSpace {
    name: String,
    engine: Arc<SerializerEngine>,
    documents: Mutex<Option<Arc<DocumentSet>>>,
}

impl XmlGenSpace {
    /// A space using the shared serializer engine.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_engine(name, SerializerEngine::shared())
    }

    pub fn with_engine(name: impl Into<String>, engine: Arc<SerializerEngine>) -> Self {
        Self {
            name: name.into(),
            engine,
            documents: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the document set on the first call; later calls return it
    /// unchanged.
    pub fn create_document_set(
        &self,
        directory: impl AsRef<Path>,
        root_element: &str,
    ) -> Result<Arc<DocumentSet>> {
        let directory = directory.as_ref();
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| XmlGenError::LockPoisoned("xmlgen space"))?;

        if let Some(existing) = documents.as_ref() {
            if existing.directory() != directory || existing.root_element() != root_element {
                warn!(
                    "Space '{}' already writes to {} with root '{}'; ignoring {} with root '{}'",
                    self.name,
                    existing.directory().display(),
                    existing.root_element(),
                    directory.display(),
                    root_element
                );
            }
            return Ok(Arc::clone(existing));
        }

        let set = Arc::new(DocumentSet::create(
            directory,
            root_element,
            Arc::clone(&self.engine),
        )?);
        info!(
            "Space '{}' writing documents to {} with root '{}'",
            self.name,
            directory.display(),
            root_element
        );
        *documents = Some(Arc::clone(&set));
        Ok(set)
    }

    /// The document set, if it has been created.
    pub fn document_set(&self) -> Result<Option<Arc<DocumentSet>>> {
        Ok(self
            .documents
            .lock()
            .map_err(|_| XmlGenError::LockPoisoned("xmlgen space"))?
            .clone())
    }

    /// Close the document set, if any.
    pub fn close(&self) -> Result<()> {
        match self.document_set()? {
            Some(set) => set.close(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ElementTemplate;

    #[test]
    fn test_create_document_set_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let space = XmlGenSpace::new("default");
        assert!(space.document_set().unwrap().is_none());

        let first = space.create_document_set(dir.path().join("out"), "root").unwrap();
        first
            .emit(0, &["a".to_string()], &ElementTemplate::with_body("kept"))
            .unwrap();
        let second = space.create_document_set(dir.path().join("out"), "root").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.file_indices().unwrap(), vec![0]);

        space.close().unwrap();
        let content = std::fs::read_to_string(first.file_path(0)).unwrap();
        assert!(content.ends_with("<root><a>kept</a></root>"));
    }

    #[test]
    fn test_close_without_documents() {
        XmlGenSpace::new("empty").close().unwrap();
    }
}
