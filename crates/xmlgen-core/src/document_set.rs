//! Registry of output documents keyed by file index.

use crate::builder::DocumentBuilder;
use crate::error::{CloseFailure, XmlGenError};
use crate::sink::{SerializerEngine, XmlStreamWriter};
use crate::template::ElementTemplate;
use crate::Result;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info};

/// A document builder writing to a file.
pub type FileDocument = DocumentBuilder<XmlStreamWriter<BufWriter<File>>>;

#[derive(Default)]
struct Registry {
    builders: HashMap<u64, Arc<FileDocument>>,
    closed: bool,
}

/// The output documents of one run, one file per index.
///
/// Files are named `xml<index>.xml` inside the output directory and are
/// created the first time their index is used. The registry lock only
/// covers lookup and creation; writes go through each document's own lock,
/// so different files are written in parallel.
pub struct DocumentSet {
    directory: PathBuf,
    root_element: String,
    engine: Arc<SerializerEngine>,
    registry: Mutex<Registry>,
}

impl DocumentSet {
    /// Prepare `directory` and start an empty set.
    ///
    /// An existing directory is emptied; a missing one is created with its
    /// parents. Fails if the path exists but is not a directory.
    pub fn create(
        directory: impl Into<PathBuf>,
        root_element: impl Into<String>,
        engine: Arc<SerializerEngine>,
    ) -> Result<Self> {
        let directory = directory.into();
        let root_element = root_element.into();
        crate::sink::validate_name(&root_element)?;
        prepare_directory(&directory)?;

        Ok(Self {
            directory,
            root_element,
            engine,
            registry: Mutex::new(Registry::default()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn root_element(&self) -> &str {
        &self.root_element
    }

    /// File name used for `file_index`.
    pub fn file_name(file_index: u64) -> String {
        format!("xml{file_index}.xml")
    }

    pub fn file_path(&self, file_index: u64) -> PathBuf {
        self.directory.join(Self::file_name(file_index))
    }

    /// Return the document for `file_index`, creating its file and root
    /// element on first use.
    pub fn get_or_create_builder(&self, file_index: u64) -> Result<Arc<FileDocument>> {
        let mut registry = self.lock()?;
        if registry.closed {
            return Err(XmlGenError::DocumentSetClosed);
        }
        if let Some(builder) = registry.builders.get(&file_index) {
            return Ok(Arc::clone(builder));
        }

        let path = self.file_path(file_index);
        let sink = self.engine.open_document(&path, &self.root_element)?;
        let builder = Arc::new(DocumentBuilder::new(path.display().to_string(), sink));
        registry.builders.insert(file_index, Arc::clone(&builder));
        debug!("Created document {}", path.display());
        Ok(builder)
    }

    /// Write `template` at `path` in the document for `file_index`.
    pub fn emit(&self, file_index: u64, path: &[String], template: &ElementTemplate) -> Result<()> {
        self.get_or_create_builder(file_index)?.emit(path, template)
    }

    /// Indices of the documents created so far, ascending.
    pub fn file_indices(&self) -> Result<Vec<u64>> {
        let mut indices: Vec<u64> = self.lock()?.builders.keys().copied().collect();
        indices.sort_unstable();
        Ok(indices)
    }

    /// Close every document.
    ///
    /// A document that fails to close does not stop the others from being
    /// closed; all failures are returned together. The set accepts no new
    /// documents afterwards.
    pub fn close(&self) -> Result<()> {
        let mut builders: Vec<(u64, Arc<FileDocument>)> = {
            let mut registry = self.lock()?;
            registry.closed = true;
            registry.builders.drain().collect()
        };
        builders.sort_unstable_by_key(|(file_index, _)| *file_index);

        let total = builders.len();
        let mut failures = Vec::new();
        for (file_index, builder) in builders {
            if let Err(e) = builder.close() {
                error!("Failed to close {}: {}", builder.label(), e);
                failures.push(CloseFailure {
                    file_index,
                    error: e,
                });
            }
        }

        info!(
            "Closed {} of {} document(s) in {}",
            total - failures.len(),
            total,
            self.directory.display()
        );
        if failures.is_empty() {
            Ok(())
        } else {
            Err(XmlGenError::CloseFailed(failures))
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Registry>> {
        self.registry
            .lock()
            .map_err(|_| XmlGenError::LockPoisoned("document registry"))
    }
}

fn prepare_directory(directory: &Path) -> Result<()> {
    let setup_error = |message: String| XmlGenError::OutputDirectory {
        path: directory.to_path_buf(),
        message,
    };

    if !directory.exists() {
        fs::create_dir_all(directory).map_err(|e| setup_error(format!("could not create: {e}")))?;
        info!("Created output directory {}", directory.display());
        return Ok(());
    }
    if !directory.is_dir() {
        return Err(setup_error("exists and is not a directory".to_string()));
    }

    let entries =
        fs::read_dir(directory).map_err(|e| setup_error(format!("could not list: {e}")))?;
    for entry in entries {
        let path = entry
            .map_err(|e| setup_error(format!("could not list: {e}")))?
            .path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| setup_error(format!("could not remove {}: {e}", path.display())))?;
    }
    info!("Cleaned output directory {}", directory.display());
    Ok(())
}
