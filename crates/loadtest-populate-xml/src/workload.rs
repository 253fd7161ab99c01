//! Workload definition: the op templates a populate run cycles through.

use crate::error::XmlPopulatorError;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;
use xmlgen_core::template::scalar_attrs;
use xmlgen_core::{ContentSpec, ContentValue, ElementTemplate};

/// Root element used when the workload does not name one.
pub const DEFAULT_ROOT: &str = "root";

/// Operation performed by an op template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Write an element at a path.
    #[default]
    Element,
}

impl Command {
    /// Parse a command name. Unknown names fall back to [`Command::Element`].
    pub fn parse(name: &str) -> Command {
        match name {
            "element" => Command::Element,
            other => {
                warn!("Unknown command '{}', falling back to 'element'", other);
                Command::Element
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Element => write!(f, "element"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWorkload {
    seed: Option<u64>,
    root: Option<String>,
    #[serde(default = "default_files")]
    files: u64,
    #[serde(default)]
    ops: Vec<RawOp>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOp {
    name: Option<String>,
    command: Option<String>,
    file: Option<serde_yaml::Value>,
    #[serde(default)]
    path: Vec<String>,
    attrs: Option<serde_yaml::Value>,
    children: Option<serde_yaml::Mapping>,
    body: Option<serde_yaml::Value>,
}

fn default_files() -> u64 {
    1
}

/// One entry of the workload's `ops` list, validated.
///
/// String leaves may still contain pattern placeholders; they are resolved
/// per cycle by [`crate::op::ElementOp::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpTemplate {
    pub name: String,
    pub command: Command,
    /// Pattern resolving to the file index; `None` spreads cycles over the
    /// workload's files.
    pub file: Option<String>,
    pub path: Vec<String>,
    pub template: ElementTemplate,
}

/// A parsed workload file.
///
/// Only built through [`Workload::from_yaml`], so there is always at least
/// one op and one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    seed: Option<u64>,
    root: String,
    files: u64,
    ops: Vec<OpTemplate>,
}

impl Workload {
    /// Load a workload from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, XmlPopulatorError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| XmlPopulatorError::WorkloadIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a workload from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, XmlPopulatorError> {
        let raw: RawWorkload = serde_yaml::from_str(yaml)?;

        if raw.ops.is_empty() {
            return Err(XmlPopulatorError::Workload(
                "at least one op is required".to_string(),
            ));
        }
        if raw.files == 0 {
            return Err(XmlPopulatorError::Workload(
                "files must be at least 1".to_string(),
            ));
        }

        let ops = raw
            .ops
            .into_iter()
            .enumerate()
            .map(|(position, op)| OpTemplate::from_raw(position, op))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Workload {
            seed: raw.seed,
            root: raw.root.unwrap_or_else(|| DEFAULT_ROOT.to_string()),
            files: raw.files,
            ops,
        })
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Name of the document root element.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Number of files cycles are spread over when an op names none.
    pub fn files(&self) -> u64 {
        self.files
    }

    pub fn ops(&self) -> &[OpTemplate] {
        &self.ops
    }

    /// The op template used for `cycle`.
    pub fn op_for_cycle(&self, cycle: u64) -> &OpTemplate {
        &self.ops[(cycle % self.ops.len() as u64) as usize]
    }
}

impl OpTemplate {
    fn from_raw(position: usize, raw: RawOp) -> Result<Self, XmlPopulatorError> {
        let name = raw.name.unwrap_or_else(|| format!("op{position}"));
        let invalid = |message: String| XmlPopulatorError::Workload(format!("op '{name}': {message}"));

        if raw.path.is_empty() {
            return Err(invalid("path must not be empty".to_string()));
        }

        let command = raw.command.as_deref().map(Command::parse).unwrap_or_default();
        let file = raw.file.map(scalar_text).transpose().map_err(|kind| {
            invalid(format!("file must be a scalar pattern, found {kind}"))
        })?;
        let attrs = match raw.attrs {
            Some(value) => scalar_attrs(&ContentValue::from(value))
                .map_err(|e| invalid(e.to_string()))?,
            None => Default::default(),
        };
        let body = raw
            .body
            .map(scalar_text)
            .transpose()
            .map_err(|kind| invalid(format!("body must be text, found {kind}")))?
            .unwrap_or_default();
        let children = raw.children.map(ContentSpec::from).unwrap_or_default();

        let template = ElementTemplate::new(children, attrs, body);
        // Patterns only rewrite text, so a template that resolves here
        // resolves for every cycle.
        template
            .resolve_children()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(OpTemplate {
            name,
            command,
            file,
            path: raw.path,
            template,
        })
    }
}

fn scalar_text(value: serde_yaml::Value) -> Result<String, &'static str> {
    match ContentValue::from(value) {
        ContentValue::Scalar(text) => Ok(text),
        other => Err(other.kind()),
    }
}
