//! Tree of currently open elements, addressed by name paths.
//!
//! Each open node owns the sink handle of its element and a name-keyed map
//! of its open children. Paths are relative to the document root, which is
//! the tree's own root node.

use crate::error::XmlGenError;
use crate::sink::{ElementId, ElementSink};
use crate::Result;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

#[derive(Debug)]
struct OpenNode {
    element: ElementId,
    children: BTreeMap<String, OpenNode>,
}

impl OpenNode {
    fn new(element: ElementId) -> Self {
        Self {
            element,
            children: BTreeMap::new(),
        }
    }

    fn count(&self) -> usize {
        1 + self.children.values().map(OpenNode::count).sum::<usize>()
    }
}

/// Open elements of one document.
#[derive(Debug)]
pub struct PathTree {
    root: Option<OpenNode>,
}

impl PathTree {
    /// Track a document whose root element is already open as `root`.
    pub fn new(root: ElementId) -> Self {
        Self {
            root: Some(OpenNode::new(root)),
        }
    }

    /// Number of open elements, root included. Zero once fully closed.
    pub fn open_count(&self) -> usize {
        self.root.as_ref().map_or(0, OpenNode::count)
    }

    pub fn is_closed(&self) -> bool {
        self.root.is_none()
    }

    /// Whether the element at `path` is currently open.
    pub fn is_open(&self, path: &[String]) -> bool {
        let mut node = match &self.root {
            Some(root) => root,
            None => return false,
        };
        for name in path {
            match node.children.get(name) {
                Some(child) => node = child,
                None => return false,
            }
        }
        true
    }

    /// Return the element at `path`, opening every missing element on the
    /// way below its deepest open ancestor.
    pub fn open<S: ElementSink + ?Sized>(&mut self, sink: &mut S, path: &[String]) -> Result<ElementId> {
        let mut node = self.root.as_mut().ok_or(XmlGenError::DocumentClosed)?;
        for name in path {
            let parent = node.element;
            node = match node.children.entry(name.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let element = sink.start_element(parent, name)?;
                    entry.insert(OpenNode::new(element))
                }
            };
        }
        Ok(node.element)
    }

    /// Close the element at `path` together with everything open below it.
    ///
    /// An empty path closes the whole document, root included. Closing a
    /// path that is not open does nothing.
    pub fn close<S: ElementSink + ?Sized>(&mut self, sink: &mut S, path: &[String]) -> Result<()> {
        let Some((last, parents)) = path.split_last() else {
            return match self.root.take() {
                Some(root) => close_subtree(sink, root),
                None => Ok(()),
            };
        };

        let Some(mut node) = self.root.as_mut() else {
            return Ok(());
        };
        for name in parents {
            match node.children.get_mut(name) {
                Some(child) => node = child,
                None => return Ok(()),
            }
        }
        match node.children.remove(last) {
            Some(subtree) => close_subtree(sink, subtree),
            None => Ok(()),
        }
    }

    /// Close and reopen the element at `path`, yielding a fresh element.
    pub fn replace<S: ElementSink + ?Sized>(
        &mut self,
        sink: &mut S,
        path: &[String],
    ) -> Result<ElementId> {
        self.close(sink, path)?;
        self.open(sink, path)
    }
}

fn close_subtree<S: ElementSink + ?Sized>(sink: &mut S, node: OpenNode) -> Result<()> {
    for (_, child) in node.children {
        close_subtree(sink, child)?;
    }
    sink.end_element(node.element)
}

/// Number of leading elements of `previous` that stay open when moving the
/// cursor to `requested`.
///
/// This is the first position where the paths differ, capped at the index
/// of `requested`'s leaf so that the leaf is always closed and reopened.
pub fn divergence_index(previous: &[String], requested: &[String]) -> usize {
    let limit = requested.len().saturating_sub(1);
    previous
        .iter()
        .zip(requested)
        .take(limit)
        .take_while(|(a, b)| a == b)
        .count()
}
