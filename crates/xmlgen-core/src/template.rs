//! Element templates, text substitution and `foreach` expansion.
//!
//! An [`ElementTemplate`] is the immutable description of what to write onto
//! one element: attributes, child content and a text body. Templates are
//! decomposed from content maps, repeated by `foreach`, and finally resolved
//! into concrete [`ResolvedElement`] trees before anything is written, so a
//! malformed description never leaves a half-written element behind.

use crate::content::{ContentSpec, ContentValue};
use crate::error::XmlGenError;
use crate::keyword::Keyword;
use crate::sink::check_text;
use crate::Result;
use indexmap::IndexMap;

/// Ordered list of literal `(placeholder, replacement)` text rewrites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    pairs: Vec<(String, String)>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rewrite; rewrites are applied in insertion order.
    pub fn with(mut self, placeholder: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.pairs.push((placeholder.into(), replacement.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Apply every rewrite to `text`, in order.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (placeholder, replacement) in &self.pairs {
            if !placeholder.is_empty() {
                result = result.replace(placeholder.as_str(), replacement);
            }
        }
        result
    }
}

impl FromIterator<(String, String)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Substitution {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Content to write onto one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementTemplate {
    children: ContentSpec,
    attrs: IndexMap<String, String>,
    body: String,
}

impl ElementTemplate {
    pub fn new(
        children: ContentSpec,
        attrs: IndexMap<String, String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            children,
            attrs,
            body: body.into(),
        }
    }

    /// A template with only a text body.
    pub fn with_body(body: impl Into<String>) -> Self {
        Self::new(ContentSpec::new(), IndexMap::new(), body)
    }

    pub fn children(&self) -> &ContentSpec {
        &self.children
    }

    pub fn attrs(&self) -> &IndexMap<String, String> {
        &self.attrs
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Return a copy with `f` applied to every text leaf: body, attribute
    /// values and scalar child content at any depth.
    pub fn map_text<F>(&self, f: &mut F) -> ElementTemplate
    where
        F: FnMut(&str) -> String,
    {
        ElementTemplate {
            children: self.children.map_text(f),
            attrs: self
                .attrs
                .iter()
                .map(|(name, value)| (name.clone(), f(value)))
                .collect(),
            body: f(&self.body),
        }
    }

    /// Return a copy with every text leaf rewritten by `subs`.
    pub fn substitute(&self, subs: &Substitution) -> ElementTemplate {
        self.map_text(&mut |text: &str| subs.apply(text))
    }

    /// Split a raw content map into the element it describes and its
    /// optional `foreach` clause.
    ///
    /// Keys are matched against [`Keyword`]; anything else names a child.
    /// Entries under `children` are always child names, even when they
    /// collide with a keyword.
    pub fn decompose(spec: &ContentSpec) -> Result<(ElementTemplate, Option<Foreach>)> {
        let mut template = ElementTemplate::default();
        let mut foreach = None;

        for (name, value) in spec.iter() {
            match Keyword::from_label(name) {
                Some(Keyword::Children) => {
                    let ContentValue::Node(children) = value else {
                        return Err(XmlGenError::invalid_content(
                            Keyword::Children.label(),
                            format!("expected a map, found {} {value}", value.kind()),
                        ));
                    };
                    for (child, child_value) in children.iter() {
                        template.insert_child(child, child_value)?;
                    }
                }
                Some(Keyword::Attrs) => {
                    template.attrs = scalar_attrs(value)?;
                }
                Some(Keyword::Body) => {
                    let Some(body) = value.as_scalar() else {
                        return Err(XmlGenError::invalid_content(
                            Keyword::Body.label(),
                            format!("expected text, found {} {value}", value.kind()),
                        ));
                    };
                    template.body = body.to_string();
                }
                Some(Keyword::Foreach) => {
                    foreach = Some(Foreach::parse(value)?);
                }
                None => template.insert_child(name, value)?,
            }
        }

        Ok((template, foreach))
    }

    /// Decompose a content map and apply its `foreach`, producing one
    /// template per sibling element.
    pub fn expand(spec: &ContentSpec) -> Result<Vec<ElementTemplate>> {
        let (template, foreach) = Self::decompose(spec)?;
        Ok(match foreach {
            Some(foreach) => foreach.expand(&template),
            None => vec![template],
        })
    }

    /// Resolve the child content into concrete elements, in declaration
    /// order.
    ///
    /// Every text leaf, including this template's own body and attribute
    /// values, must consist of characters XML can carry.
    pub fn resolve_children(&self) -> Result<Vec<ResolvedElement>> {
        check_text(&self.body, || Keyword::Body.to_string())?;
        for (name, value) in &self.attrs {
            check_text(value, || format!("{}.{name}", Keyword::Attrs))?;
        }
        let mut resolved = Vec::with_capacity(self.children.len());
        for (name, value) in self.children.iter() {
            resolve_value(name, value, &mut resolved)?;
        }
        Ok(resolved)
    }

    fn insert_child(&mut self, name: &str, value: &ContentValue) -> Result<()> {
        if self.children.contains(name) {
            return Err(XmlGenError::DuplicateChild(name.to_string()));
        }
        self.children.insert(name, value.clone());
        Ok(())
    }
}

/// Convert an `attrs` value into attribute name/value pairs.
pub fn scalar_attrs(value: &ContentValue) -> Result<IndexMap<String, String>> {
    let ContentValue::Node(attrs) = value else {
        return Err(XmlGenError::invalid_content(
            Keyword::Attrs.label(),
            format!("expected a map, found {} {value}", value.kind()),
        ));
    };
    attrs
        .iter()
        .map(|(name, value)| match value.as_scalar() {
            Some(text) => Ok((name.to_string(), text.to_string())),
            None => Err(XmlGenError::invalid_content(
                format!("{}.{name}", Keyword::Attrs),
                format!("attribute values must be scalars, found {} {value}", value.kind()),
            )),
        })
        .collect()
}

/// A parsed `foreach: [placeholder, [items...]]` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Foreach {
    placeholder: String,
    items: Vec<String>,
}

impl Foreach {
    pub fn new(placeholder: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            items,
        }
    }

    pub fn parse(value: &ContentValue) -> Result<Foreach> {
        let malformed = |reason| XmlGenError::MalformedForeach {
            value: value.to_string(),
            reason,
        };

        let ContentValue::Sequence(parts) = value else {
            return Err(malformed("expected [placeholder, [items...]]"));
        };
        let [placeholder, items] = parts.as_slice() else {
            return Err(malformed("expected exactly two entries"));
        };
        let placeholder = placeholder
            .as_scalar()
            .ok_or_else(|| malformed("placeholder must be a scalar"))?;
        if placeholder.is_empty() {
            return Err(malformed("placeholder must not be empty"));
        }
        let ContentValue::Sequence(items) = items else {
            return Err(malformed("items must be a sequence"));
        };
        if items.is_empty() {
            return Err(malformed("items must not be empty"));
        }
        let items = items
            .iter()
            .map(|item| item.as_scalar().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| malformed("items must be scalars"))?;

        Ok(Foreach::new(placeholder, items))
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// The literal text replaced in each sibling, `[placeholder]`.
    pub fn token(&self) -> String {
        format!("[{}]", self.placeholder)
    }

    /// One independent copy of `template` per item, with the token
    /// replaced by that item.
    pub fn expand(&self, template: &ElementTemplate) -> Vec<ElementTemplate> {
        let token = self.token();
        self.items
            .iter()
            .map(|item| template.substitute(&Substitution::new().with(token.as_str(), item.as_str())))
            .collect()
    }
}

/// A fully expanded child element, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<ResolvedElement>,
    pub body: String,
}

impl ResolvedElement {
    /// A leaf element holding only text.
    pub fn leaf(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            body: body.into(),
        }
    }
}

fn resolve_value(name: &str, value: &ContentValue, out: &mut Vec<ResolvedElement>) -> Result<()> {
    match value {
        ContentValue::Scalar(text) => {
            check_text(text, || name.to_string())?;
            out.push(ResolvedElement::leaf(name, text.as_str()));
        }
        ContentValue::Node(spec) => {
            for template in ElementTemplate::expand(spec)? {
                let children = template.resolve_children()?;
                out.push(ResolvedElement {
                    name: name.to_string(),
                    attrs: template.attrs.into_iter().collect(),
                    children,
                    body: template.body,
                });
            }
        }
        ContentValue::Sequence(items) => {
            for item in items {
                resolve_value(name, item, out)?;
            }
        }
    }
    Ok(())
}
