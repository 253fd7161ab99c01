//! Structural keywords recognized inside content maps.
//!
//! A content map mixes two kinds of keys: the reserved labels below, which
//! describe the element itself, and arbitrary element names, which declare
//! child elements.

use std::fmt;

/// Reserved key of a content map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Map of explicitly declared child elements.
    Children,
    /// Map of attribute name to scalar value.
    Attrs,
    /// Text body of the element.
    Body,
    /// `[placeholder, [items...]]` repetition of the element.
    Foreach,
}

impl Keyword {
    /// Every keyword, in the order they are applied when writing.
    pub const ALL: [Keyword; 4] = [
        Keyword::Foreach,
        Keyword::Attrs,
        Keyword::Children,
        Keyword::Body,
    ];

    /// The map key for this keyword.
    pub const fn label(self) -> &'static str {
        match self {
            Keyword::Children => "children",
            Keyword::Attrs => "attrs",
            Keyword::Body => "body",
            Keyword::Foreach => "foreach",
        }
    }

    /// Look up a keyword by its map key.
    pub fn from_label(label: &str) -> Option<Keyword> {
        match label {
            "children" => Some(Keyword::Children),
            "attrs" => Some(Keyword::Attrs),
            "body" => Some(Keyword::Body),
            "foreach" => Some(Keyword::Foreach),
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
