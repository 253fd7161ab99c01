//! Content description values.
//!
//! Workload files describe element content as loosely typed YAML maps. This
//! module converts them once into [`ContentValue`] trees so that later stages
//! match on shape instead of probing types.

use indexmap::IndexMap;
use std::fmt;

/// One value inside a content description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentValue {
    /// Leaf text. Numbers and booleans are stored in their text form.
    Scalar(String),
    /// Nested content map.
    Node(ContentSpec),
    /// Sibling values sharing one name.
    Sequence(Vec<ContentValue>),
}

impl ContentValue {
    /// Create a scalar value.
    pub fn scalar(text: impl Into<String>) -> Self {
        ContentValue::Scalar(text.into())
    }

    /// The text of a scalar value.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ContentValue::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Rebuild this value, applying `f` to every scalar leaf.
    ///
    /// Map keys are left untouched; only leaf text changes.
    pub fn map_text<F>(&self, f: &mut F) -> ContentValue
    where
        F: FnMut(&str) -> String,
    {
        match self {
            ContentValue::Scalar(text) => ContentValue::Scalar(f(text)),
            ContentValue::Node(spec) => ContentValue::Node(spec.map_text(f)),
            ContentValue::Sequence(items) => {
                ContentValue::Sequence(items.iter().map(|item| item.map_text(f)).collect())
            }
        }
    }

    /// Short human readable name of the value's shape.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentValue::Scalar(_) => "scalar",
            ContentValue::Node(_) => "map",
            ContentValue::Sequence(_) => "sequence",
        }
    }
}

impl fmt::Display for ContentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentValue::Scalar(text) => write!(f, "{text:?}"),
            ContentValue::Node(spec) => write!(f, "{spec}"),
            ContentValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for ContentValue {
    fn from(text: &str) -> Self {
        ContentValue::Scalar(text.to_string())
    }
}

impl From<String> for ContentValue {
    fn from(text: String) -> Self {
        ContentValue::Scalar(text)
    }
}

impl From<ContentSpec> for ContentValue {
    fn from(spec: ContentSpec) -> Self {
        ContentValue::Node(spec)
    }
}

impl From<Vec<ContentValue>> for ContentValue {
    fn from(items: Vec<ContentValue>) -> Self {
        ContentValue::Sequence(items)
    }
}

impl From<serde_yaml::Value> for ContentValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => ContentValue::Scalar(String::new()),
            Value::Bool(b) => ContentValue::Scalar(b.to_string()),
            Value::Number(n) => ContentValue::Scalar(n.to_string()),
            Value::String(s) => ContentValue::Scalar(s),
            Value::Sequence(items) => {
                ContentValue::Sequence(items.into_iter().map(ContentValue::from).collect())
            }
            Value::Mapping(mapping) => ContentValue::Node(ContentSpec::from(mapping)),
            Value::Tagged(tagged) => ContentValue::from(tagged.value),
        }
    }
}

impl From<serde_json::Value> for ContentValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ContentValue::Scalar(String::new()),
            Value::Bool(b) => ContentValue::Scalar(b.to_string()),
            Value::Number(n) => ContentValue::Scalar(n.to_string()),
            Value::String(s) => ContentValue::Scalar(s),
            Value::Array(items) => {
                ContentValue::Sequence(items.into_iter().map(ContentValue::from).collect())
            }
            Value::Object(map) => ContentValue::Node(
                map.into_iter()
                    .map(|(key, value)| (key, ContentValue::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Insertion-ordered map of name to [`ContentValue`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSpec {
    entries: IndexMap<String, ContentValue>,
}

impl ContentSpec {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the previous value for `name`.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ContentValue>,
    ) -> Option<ContentValue> {
        self.entries.insert(name.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ContentValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ContentValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Rebuild this map, applying `f` to every scalar leaf.
    pub fn map_text<F>(&self, f: &mut F) -> ContentSpec
    where
        F: FnMut(&str) -> String,
    {
        ContentSpec {
            entries: self
                .entries
                .iter()
                .map(|(name, value)| (name.clone(), value.map_text(f)))
                .collect(),
        }
    }

    /// Parse a YAML document whose top level is a map.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let mapping: serde_yaml::Mapping = serde_yaml::from_str(yaml)?;
        Ok(ContentSpec::from(mapping))
    }
}

impl fmt::Display for ContentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

impl FromIterator<(String, ContentValue)> for ContentSpec {
    fn from_iter<I: IntoIterator<Item = (String, ContentValue)>>(iter: I) -> Self {
        ContentSpec {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ContentSpec {
    type Item = (String, ContentValue);
    type IntoIter = indexmap::map::IntoIter<String, ContentValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<serde_yaml::Mapping> for ContentSpec {
    fn from(mapping: serde_yaml::Mapping) -> Self {
        mapping
            .into_iter()
            .map(|(key, value)| (yaml_key(key), ContentValue::from(value)))
            .collect()
    }
}

/// Map keys are names; non-string keys (`1: x`, `true: y`) use their text.
fn yaml_key(key: serde_yaml::Value) -> String {
    match ContentValue::from(key) {
        ContentValue::Scalar(text) => text,
        other => other.to_string(),
    }
}
