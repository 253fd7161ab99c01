//! Test support: an [`ElementSink`] that records every call.

use crate::sink::{ElementId, ElementSink};
use crate::Result;
use std::collections::HashMap;

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Start {
        parent: ElementId,
        element: ElementId,
        name: String,
    },
    Attribute {
        element: ElementId,
        name: String,
        value: String,
    },
    Text {
        element: ElementId,
        text: String,
    },
    End {
        element: ElementId,
        name: String,
    },
    Finish,
}

/// Sink that accepts every call and remembers it.
///
/// Unlike the XML writer it enforces no streaming order, so trees with
/// several open branches can be inspected.
#[derive(Debug)]
pub struct RecordingSink {
    root: ElementId,
    names: HashMap<ElementId, String>,
    events: Vec<SinkEvent>,
    next_id: u64,
}

impl RecordingSink {
    pub fn new(root_name: &str) -> Self {
        let root = ElementId(0);
        Self {
            root,
            names: HashMap::from([(root, root_name.to_string())]),
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Forget the calls recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Names of started elements, in call order.
    pub fn opened_names(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Start { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names of ended elements, in call order.
    pub fn closed_names(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::End { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ElementSink for RecordingSink {
    fn root(&self) -> ElementId {
        self.root
    }

    fn start_element(&mut self, parent: ElementId, name: &str) -> Result<ElementId> {
        let element = ElementId(self.next_id);
        self.next_id += 1;
        self.names.insert(element, name.to_string());
        self.events.push(SinkEvent::Start {
            parent,
            element,
            name: name.to_string(),
        });
        Ok(element)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> Result<()> {
        self.events.push(SinkEvent::Attribute {
            element,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn write_text(&mut self, element: ElementId, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.events.push(SinkEvent::Text {
            element,
            text: text.to_string(),
        });
        Ok(())
    }

    fn end_element(&mut self, element: ElementId) -> Result<()> {
        let name = self.names.get(&element).cloned().unwrap_or_default();
        self.events.push(SinkEvent::End { element, name });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.events.push(SinkEvent::Finish);
        Ok(())
    }
}
