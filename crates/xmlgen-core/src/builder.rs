//! Per-document cursor over the open element tree.

use crate::error::XmlGenError;
use crate::path_tree::{divergence_index, PathTree};
use crate::sink::{ElementId, ElementSink};
use crate::template::{ElementTemplate, ResolvedElement};
use crate::Result;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, trace};

/// Lifecycle state of a [`DocumentBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderStatus {
    /// Accepting `emit` calls.
    Open,
    /// A structural error left the document in an unknown state.
    Failed(String),
    /// The document was closed and flushed.
    Closed,
}

struct BuilderState<S> {
    sink: S,
    tree: PathTree,
    /// Path of the deepest open element, the "live path".
    cursor: Vec<String>,
    status: BuilderStatus,
    emitted: u64,
}

/// Writes templated elements into one document.
///
/// The builder keeps the elements of the last emitted path open. A new
/// `emit` only closes the part of that path that differs from the requested
/// one (and always the requested leaf), so consecutive calls sharing a
/// prefix extend the same parent elements.
///
/// Calls are serialized on an internal mutex; a builder can be shared
/// between threads behind an `Arc`.
pub struct DocumentBuilder<S> {
    label: String,
    state: Mutex<BuilderState<S>>,
}

impl<S: ElementSink> DocumentBuilder<S> {
    /// Wrap a sink whose root element is open. `label` names the document
    /// in logs and errors.
    pub fn new(label: impl Into<String>, sink: S) -> Self {
        let tree = PathTree::new(sink.root());
        Self {
            label: label.into(),
            state: Mutex::new(BuilderState {
                sink,
                tree,
                cursor: Vec::new(),
                status: BuilderStatus::Open,
                emitted: 0,
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Write `template` onto a fresh element at `path`, leaving it open.
    ///
    /// Configuration errors in the template are reported before anything is
    /// written and leave the document usable. Any error raised while writing
    /// makes the document unusable.
    pub fn emit(&self, path: &[String], template: &ElementTemplate) -> Result<()> {
        if path.is_empty() {
            return Err(XmlGenError::EmptyPath);
        }
        let children = template.resolve_children()?;

        let mut state = self.lock()?;
        state.ensure_open()?;
        trace!("{}: emit {:?}", self.label, path);

        let result = state.write(path, template, &children);
        match &result {
            Ok(()) => state.emitted += 1,
            Err(e) => {
                debug!("{}: marking document unusable: {}", self.label, e);
                state.status = BuilderStatus::Failed(e.to_string());
            }
        }
        result
    }

    /// Close every open element, root last, and flush the document.
    ///
    /// Closing an already closed document does nothing.
    pub fn close(&self) -> Result<()> {
        let mut state = self.lock()?;
        match &state.status {
            BuilderStatus::Closed => return Ok(()),
            BuilderStatus::Failed(reason) => {
                return Err(XmlGenError::DocumentUnusable(reason.clone()));
            }
            BuilderStatus::Open => {}
        }

        let state = &mut *state;
        let result = state
            .tree
            .close(&mut state.sink, &[])
            .and_then(|()| state.sink.finish());
        state.cursor.clear();
        state.status = match &result {
            Ok(()) => BuilderStatus::Closed,
            Err(e) => BuilderStatus::Failed(e.to_string()),
        };
        debug!("{}: closed after {} element(s)", self.label, state.emitted);
        result
    }

    pub fn status(&self) -> Result<BuilderStatus> {
        Ok(self.lock()?.status.clone())
    }

    /// The currently open path below the root.
    pub fn cursor(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.cursor.clone())
    }

    /// Number of successful `emit` calls.
    pub fn emitted(&self) -> Result<u64> {
        Ok(self.lock()?.emitted)
    }

    /// Inspect the sink while holding the document lock.
    pub fn with_sink<R>(&self, f: impl FnOnce(&S) -> R) -> Result<R> {
        Ok(f(&self.lock()?.sink))
    }

    /// Take the sink back, e.g. to read an in-memory document.
    pub fn into_sink(self) -> Result<S> {
        self.state
            .into_inner()
            .map(|state| state.sink)
            .map_err(|_| XmlGenError::LockPoisoned("document builder"))
    }

    fn lock(&self) -> Result<MutexGuard<'_, BuilderState<S>>> {
        self.state
            .lock()
            .map_err(|_| XmlGenError::LockPoisoned("document builder"))
    }
}

impl<S: ElementSink> BuilderState<S> {
    fn ensure_open(&self) -> Result<()> {
        match &self.status {
            BuilderStatus::Open => Ok(()),
            BuilderStatus::Failed(reason) => Err(XmlGenError::DocumentUnusable(reason.clone())),
            BuilderStatus::Closed => Err(XmlGenError::DocumentClosed),
        }
    }

    fn write(
        &mut self,
        path: &[String],
        template: &ElementTemplate,
        children: &[ResolvedElement],
    ) -> Result<()> {
        let keep = divergence_index(&self.cursor, path);
        if keep < self.cursor.len() {
            self.tree.close(&mut self.sink, &self.cursor[..=keep])?;
        }
        self.cursor.truncate(keep);

        let leaf = self.tree.open(&mut self.sink, path)?;
        self.cursor = path.to_vec();

        for (name, value) in template.attrs() {
            self.sink.set_attribute(leaf, name, value)?;
        }
        for child in children {
            write_resolved(&mut self.sink, leaf, child)?;
        }
        self.sink.write_text(leaf, template.body())
    }
}

fn write_resolved<S: ElementSink>(
    sink: &mut S,
    parent: ElementId,
    element: &ResolvedElement,
) -> Result<()> {
    let id = sink.start_element(parent, &element.name)?;
    for (name, value) in &element.attrs {
        sink.set_attribute(id, name, value)?;
    }
    for child in &element.children {
        write_resolved(sink, id, child)?;
    }
    sink.write_text(id, &element.body)?;
    sink.end_element(id)
}
