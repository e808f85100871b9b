//! The DOM value extractor grammar: `[!] [selector] text` or `[!] [selector] attr(NAME)`.
//!
//! A value wrapped in single quotes (`'like this'`) is a literal and is returned as-is.

use std::str::FromStr;

use beacon_traits::{Dom, NodeId};
use thiserror::Error;

use crate::Diagnostics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractorKind {
    /// The concatenated text of the selected nodes
    Text,
    /// The named attribute of the first selected node
    Attr(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extractor {
    /// The selector to resolve. Empty means "the scope element itself".
    pub selector: String,
    pub kind: ExtractorKind,
    /// Resolve `selector` against the whole document instead of within the scope element
    pub global: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractorError {
    #[error("extractor is empty")]
    Empty,
    #[error("extractor {0} is not supported")]
    Unsupported(String),
    #[error("extractor {0} requires an argument")]
    MissingArgument(String),
    #[error("extractor {0} takes no argument")]
    UnexpectedArgument(String),
    #[error("malformed extractor token {0:?}")]
    Malformed(String),
}

impl Extractor {
    /// The attribute an `attr(...)` extractor reads
    pub fn attribute(&self) -> Option<&str> {
        match &self.kind {
            ExtractorKind::Attr(name) => Some(name),
            ExtractorKind::Text => None,
        }
    }

    /// Resolve the nodes this extractor reads from.
    fn select(&self, dom: &dyn Dom, scope: Option<NodeId>) -> Vec<NodeId> {
        if self.selector.is_empty() {
            return scope.into_iter().collect();
        }
        if self.global {
            return dom.query_selector_all(&self.selector);
        }
        match scope {
            Some(scope) => dom.find(scope, &self.selector),
            None => Vec::new(),
        }
    }

    /// Pull a value out of `dom`. `scope` is the element non-global selectors are resolved in.
    pub fn extract(&self, dom: &dyn Dom, scope: Option<NodeId>) -> Option<String> {
        let nodes = self.select(dom, scope);
        match &self.kind {
            ExtractorKind::Text => Some(nodes.into_iter().map(|node| dom.text(node)).collect()),
            ExtractorKind::Attr(name) => {
                let node = *nodes.first()?;
                dom.attr(node, name).map(str::to_string)
            }
        }
    }
}

impl FromStr for Extractor {
    type Err = ExtractorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let (selector, token) = match value.rfind(char::is_whitespace) {
            Some(idx) => (value[..idx].trim(), value[idx..].trim_start()),
            None => ("", value),
        };
        if token.is_empty() {
            return Err(ExtractorError::Empty);
        }

        let (global, selector) = match selector.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, selector),
        };

        let name_len = token
            .find(|c: char| !c.is_ascii_lowercase())
            .unwrap_or(token.len());
        let (name, rest) = token.split_at(name_len);
        let argument = if rest.is_empty() {
            None
        } else {
            let inner = rest
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| ExtractorError::Malformed(token.to_string()))?;
            Some(inner)
        };

        let kind = match (name, argument) {
            ("text", None) => ExtractorKind::Text,
            ("text", Some(_)) => return Err(ExtractorError::UnexpectedArgument(name.to_string())),
            ("attr", Some(attr)) if !attr.is_empty() => ExtractorKind::Attr(attr.to_string()),
            ("attr", _) => return Err(ExtractorError::MissingArgument(name.to_string())),
            _ => return Err(ExtractorError::Unsupported(token.to_string())),
        };

        Ok(Extractor {
            selector: selector.to_string(),
            kind,
            global,
        })
    }
}

/// The contents of a `'quoted'` literal value
fn literal(value: &str) -> Option<&str> {
    value
        .trim()
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
}

/// Parse an extractor string, logging (and returning `None`) when it is not understood.
pub fn parse_extractor(value: &str, log: &Diagnostics) -> Option<Extractor> {
    match value.parse() {
        Ok(extractor) => Some(extractor),
        Err(err) => {
            log.warn(format_args!("Cannot parse extractor {value:?}: {err}"));
            None
        }
    }
}

/// Resolve `value` to a string: either a `'literal'`, or an extractor evaluated against `dom`
/// with non-global selectors searched within `scope`.
pub fn extract_value(
    dom: &dyn Dom,
    scope: Option<NodeId>,
    value: &str,
    log: &Diagnostics,
) -> Option<String> {
    if let Some(literal) = literal(value) {
        return Some(literal.to_string());
    }
    parse_extractor(value, log)?.extract(dom, scope)
}
