//! Typed element selectors.
//!
//! Locator strategies describe what they want structurally (a tag plus
//! attribute constraints) instead of as raw CSS strings. The WebDriver
//! backend compiles a [`Query`] to a CSS selector list; the mock
//! backend evaluates it directly against its node tree. Either way the
//! strategies stay backend-agnostic.

use std::fmt;

/// A single attribute constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    /// `[name="value"]`
    Equals { name: String, value: String },
    /// `[name*="value"]`
    Contains { name: String, value: String },
}

/// One simple selector: optional tag name plus attribute constraints.
/// No tag means any element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub attrs: Vec<AttrMatch>,
}

impl Selector {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            attrs: Vec::new(),
        }
    }

    /// Match any element; combine with attribute constraints.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn attr_eq(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(AttrMatch::Equals {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn attr_contains(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(AttrMatch::Contains {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => f.write_str(tag)?,
            None => f.write_str("*")?,
        }
        for attr in &self.attrs {
            match attr {
                AttrMatch::Equals { name, value } => write!(f, "[{name}=\"{value}\"]")?,
                AttrMatch::Contains { name, value } => write!(f, "[{name}*=\"{value}\"]")?,
            }
        }
        Ok(())
    }
}

/// A union of simple selectors, equivalent to a comma-separated CSS
/// selector list. Matches in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub selectors: Vec<Selector>,
}

impl Query {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    pub fn one(selector: Selector) -> Self {
        Self {
            selectors: vec![selector],
        }
    }

    /// Every element.
    pub fn all() -> Self {
        Self::one(Selector::any())
    }

    /// Union of bare tag selectors.
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: tags.into_iter().map(Selector::tag).collect(),
        }
    }

    /// Compile to a CSS selector list for selector-based backends.
    pub fn to_css(&self) -> String {
        self.selectors
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<Selector> for Query {
    fn from(selector: Selector) -> Self {
        Query::one(selector)
    }
}
