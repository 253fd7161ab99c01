//! Streaming serializer primitives.
//!
//! [`ElementSink`] is the narrow interface the document builder writes
//! through. [`XmlStreamWriter`] implements it on top of `quick_xml::Writer`,
//! writing each event as soon as it is final. [`SerializerEngine`] holds the
//! shared output settings and opens file-backed writers.

use crate::error::XmlGenError;
use crate::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Default buffer size for document writers.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Handle to an element opened through an [`ElementSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Low-level, forward-only element writer.
pub trait ElementSink {
    /// The document root element, opened when the sink was created.
    fn root(&self) -> ElementId;

    /// Open a child element of `parent`.
    fn start_element(&mut self, parent: ElementId, name: &str) -> Result<ElementId>;

    /// Set an attribute on an element that has no content yet.
    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> Result<()>;

    /// Append text content to an element.
    fn write_text(&mut self, element: ElementId, text: &str) -> Result<()>;

    /// Close an element.
    fn end_element(&mut self, element: ElementId) -> Result<()>;

    /// Flush everything written so far. All elements must be closed.
    fn finish(&mut self) -> Result<()>;
}

struct OpenFrame {
    id: ElementId,
    name: String,
}

/// [`ElementSink`] writing XML text to `W`.
///
/// Only the innermost open element accepts children, attributes, text or an
/// end tag. The start tag of the newest element is held back until its first
/// content so that attributes can still be added; an element closed without
/// content is written as `<name/>`.
pub struct XmlStreamWriter<W: Write> {
    writer: Writer<W>,
    stack: Vec<OpenFrame>,
    pending: Option<BytesStart<'static>>,
    root: ElementId,
    next_id: u64,
}

impl<W: Write> XmlStreamWriter<W> {
    /// Start a document on `inner` with the given root element.
    pub fn new(inner: W, root_name: &str, declaration: bool) -> Result<Self> {
        validate_name(root_name)?;

        let mut writer = Writer::new(inner);
        if declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        let root = ElementId(0);
        Ok(Self {
            writer,
            stack: vec![OpenFrame {
                id: root,
                name: root_name.to_string(),
            }],
            pending: Some(BytesStart::new(root_name.to_string())),
            root,
            next_id: 1,
        })
    }

    /// Consume the writer, returning the underlying output.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn innermost(&self, element: ElementId, action: &str) -> Result<&OpenFrame> {
        match self.stack.last() {
            Some(frame) if frame.id == element => Ok(frame),
            Some(frame) => Err(XmlGenError::OutOfOrder(format!(
                "{action} on element #{} while '{}' is the innermost open element",
                element.0, frame.name
            ))),
            None => Err(XmlGenError::OutOfOrder(format!(
                "{action} on element #{} after the document was finished",
                element.0
            ))),
        }
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}

impl<W: Write> ElementSink for XmlStreamWriter<W> {
    fn root(&self) -> ElementId {
        self.root
    }

    fn start_element(&mut self, parent: ElementId, name: &str) -> Result<ElementId> {
        self.innermost(parent, "start child")?;
        validate_name(name)?;
        self.flush_pending()?;

        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.stack.push(OpenFrame {
            id,
            name: name.to_string(),
        });
        self.pending = Some(BytesStart::new(name.to_string()));
        Ok(id)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> Result<()> {
        let frame_name = self.innermost(element, "set attribute")?.name.clone();
        validate_name(name)?;
        check_text(value, || format!("{frame_name}@{name}"))?;
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(XmlGenError::OutOfOrder(format!(
                "attribute '{name}' on '{frame_name}' after its content was written"
            ))),
        }
    }

    fn write_text(&mut self, element: ElementId, text: &str) -> Result<()> {
        let frame_name = &self.innermost(element, "write text")?.name;
        if text.is_empty() {
            return Ok(());
        }
        check_text(text, || frame_name.clone())?;
        self.flush_pending()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    fn end_element(&mut self, element: ElementId) -> Result<()> {
        self.innermost(element, "end element")?;
        let Some(frame) = self.stack.pop() else {
            return Err(XmlGenError::OutOfOrder("end element on an empty stack".into()));
        };
        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self
                .writer
                .write_event(Event::End(BytesEnd::new(frame.name)))?,
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(frame) = self.stack.last() {
            return Err(XmlGenError::OutOfOrder(format!(
                "finish while '{}' is still open",
                frame.name
            )));
        }
        self.writer.get_mut().flush()?;
        Ok(())
    }
}

/// Check that `name` is usable as an XML element or attribute name.
pub fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_' || first == ':')
                && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(XmlGenError::InvalidName(name.to_string()))
    }
}

/// Whether `c` may appear in XML 1.0 character data.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
    )
}

/// Check that `text` contains only characters XML can carry, naming the
/// offending `field` otherwise.
pub(crate) fn check_text(text: &str, field: impl FnOnce() -> String) -> Result<()> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(XmlGenError::invalid_content(
            field(),
            format!("character U+{:04X} is not allowed in XML", u32::from(c)),
        )),
        None => Ok(()),
    }
}

/// Output settings shared by every document of an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Capacity of each document's write buffer.
    pub buffer_size: usize,
    /// Write `<?xml version="1.0" encoding="UTF-8"?>` at the top of each file.
    pub declaration: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            declaration: true,
        }
    }
}

/// Factory for file-backed document writers.
#[derive(Debug, Default)]
pub struct SerializerEngine {
    config: EngineConfig,
}

static SHARED_ENGINE: OnceLock<Arc<SerializerEngine>> = OnceLock::new();

impl SerializerEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The process-wide engine with default settings, created on first use.
    pub fn shared() -> Arc<SerializerEngine> {
        SHARED_ENGINE
            .get_or_init(|| {
                debug!("Initializing shared serializer engine");
                Arc::new(SerializerEngine::default())
            })
            .clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create `path` (which must not exist) and start a document in it.
    pub fn open_document(
        &self,
        path: &Path,
        root_name: &str,
    ) -> Result<XmlStreamWriter<BufWriter<File>>> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => XmlGenError::FileExists(path.to_path_buf()),
                _ => XmlGenError::Io(e),
            })?;
        let writer = BufWriter::with_capacity(self.config.buffer_size, file);
        XmlStreamWriter::new(writer, root_name, self.config.declaration)
    }
}
