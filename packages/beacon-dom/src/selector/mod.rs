//! CSS selector support on top of Servo's `selectors` crate.
//!
//! [`DomSelectors`] plugs the document's atoms into the selector parser and
//! `NodeRef` implements [`selectors::Element`] over the slab tree. Tree
//! structural pseudo-classes (`:first-child`, `:nth-child(..)`, `:not(..)`), attribute
//! operators and combinators come from the crate. Other pseudo-classes and pseudo-elements are
//! rejected at parse time.

mod element;

use std::fmt;

use cssparser::{ParserInput, ToCss};
use markup5ever::{LocalName, Namespace};
use precomputed_hash::PrecomputedHash;
use selectors::matching::{
    IgnoreNthChildForInvalidation, MatchingContext, MatchingMode, NeedsSelectorFlags,
    QuirksMode, matches_selector,
};
use selectors::NthIndexCache;
use selectors::parser::{ParseRelative, SelectorParseErrorKind};
use thiserror::Error;

use crate::Document;
use element::NodeRef;

pub type SelectorList = selectors::parser::SelectorList<DomSelectors>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector {selector:?} at column {column}: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub column: u32,
    pub reason: String,
}

/// Parse a comma separated list of selectors.
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let mut parser_input = ParserInput::new(input);
    let mut parser = cssparser::Parser::new(&mut parser_input);
    SelectorList::parse(&SelectorParser, &mut parser, ParseRelative::No).map_err(|err| {
        SelectorError {
            selector: input.to_string(),
            column: err.location.column,
            reason: format!("{:?}", err.kind),
        }
    })
}

/// Whether the element `node_id` matches any selector of `list`. Non-element nodes never match.
pub fn matches_selector_list(doc: &Document, node_id: usize, list: &SelectorList) -> bool {
    let Some(element) = NodeRef::element(doc, node_id) else {
        return false;
    };
    let mut nth_index_cache = NthIndexCache::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut nth_index_cache,
        QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        IgnoreNthChildForInvalidation::No,
    );
    list.0
        .iter()
        .any(|selector| matches_selector(selector, 0, None, &element, &mut context))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomSelectors;

impl selectors::parser::SelectorImpl for DomSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = AttrValue;
    type Identifier = Ident;
    type LocalName = Ident;
    type NamespacePrefix = Ident;
    type NamespaceUrl = Namespace;
    type BorrowedNamespaceUrl = Namespace;
    type BorrowedLocalName = Ident;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

struct SelectorParser;

impl<'i> selectors::parser::Parser<'i> for SelectorParser {
    type Impl = DomSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

/// An attribute value inside `[name=value]`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrValue(pub String);

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for AttrValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for AttrValue {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_string(&self.0, dest)
    }
}

/// Tag names, ids, classes and attribute names, interned like the tree's own names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ident(pub LocalName);

impl From<&str> for Ident {
    fn from(value: &str) -> Self {
        Self(LocalName::from(value))
    }
}

impl ToCss for Ident {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_identifier(&self.0, dest)
    }
}

impl PrecomputedHash for Ident {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NonTSPseudoClass {}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = DomSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PseudoElement {}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = DomSelectors;
}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lists_with_combinators_and_operators() {
        let list = parse_selector_list("ul.menu > li[data-value=item2] a, [title^=\"foo b\"]")
            .unwrap();
        assert_eq!(list.0.len(), 2);
        assert!(parse_selector_list("li:first-child, li:not(.x), li:nth-child(2n+1)").is_ok());
    }

    #[test]
    fn rejects_malformed_selectors() {
        assert!(parse_selector_list("").is_err());
        assert!(parse_selector_list("div >").is_err());
        assert!(parse_selector_list("li..x").is_err());
        assert!(parse_selector_list("a:hover").is_err());
        let err = parse_selector_list("li::before").unwrap_err();
        assert_eq!(err.selector, "li::before");
    }
}
