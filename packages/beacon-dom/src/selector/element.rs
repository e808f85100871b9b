use std::fmt;

use markup5ever::{Namespace, ns};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{ElementSelectorFlags, MatchingContext};
use selectors::{Element, OpaqueElement};

use super::{AttrValue, DomSelectors, Ident, NonTSPseudoClass, PseudoElement};
use crate::Document;
use crate::node::{ElementData, Node, NodeData};

/// An element of a [`Document`], as seen by the selector matcher.
#[derive(Clone, Copy)]
pub(crate) struct NodeRef<'a> {
    doc: &'a Document,
    node: &'a Node,
    data: &'a ElementData,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> ({})", self.data.tag_name(), self.node.id)
    }
}

impl<'a> NodeRef<'a> {
    /// `None` unless `node_id` is an element of `doc`
    pub(crate) fn element(doc: &'a Document, node_id: usize) -> Option<Self> {
        let node = doc.get_node(node_id)?;
        let data = node.element_data()?;
        Some(Self { doc, node, data })
    }

    fn siblings(&self) -> &'a [usize] {
        self.node
            .parent
            .and_then(|parent| self.doc.get_node(parent))
            .map(|parent| parent.children.as_slice())
            .unwrap_or_default()
    }

    fn position(&self) -> Option<usize> {
        self.siblings().iter().position(|id| *id == self.node.id)
    }

    fn first_element_in(&self, mut ids: impl Iterator<Item = &'a usize>) -> Option<Self> {
        let doc = self.doc;
        ids.find_map(|id| Self::element(doc, *id))
    }
}

impl Element for NodeRef<'_> {
    type Impl = DomSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.node)
    }

    fn parent_element(&self) -> Option<Self> {
        Self::element(self.doc, self.node.parent?)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let position = self.position()?;
        self.first_element_in(self.siblings()[..position].iter().rev())
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let position = self.position()?;
        self.first_element_in(self.siblings()[position + 1..].iter())
    }

    fn first_element_child(&self) -> Option<Self> {
        self.first_element_in(self.node.children.iter())
    }

    fn is_html_element_in_html_document(&self) -> bool {
        self.data.name.ns == ns!(html)
    }

    fn has_local_name(&self, local_name: &Ident) -> bool {
        self.data.name.local == local_name.0
    }

    fn has_namespace(&self, ns: &Namespace) -> bool {
        self.data.name.ns == *ns
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.data.name.local == other.data.name.local && self.data.name.ns == other.data.name.ns
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&Namespace>,
        local_name: &Ident,
        operation: &AttrSelectorOperation<&AttrValue>,
    ) -> bool {
        self.data.attrs.iter().any(|attr| {
            !matches!(*ns, NamespaceConstraint::Specific(url) if *url != attr.name.ns)
                && attr.name.local == local_name.0
                && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<DomSelectors>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<DomSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        matches!(self.data.tag_name(), "a" | "area" | "link") && self.data.has_attr("href")
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &Ident, case_sensitivity: CaseSensitivity) -> bool {
        self.data
            .id()
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &Ident, case_sensitivity: CaseSensitivity) -> bool {
        self.data.attr("class").is_some_and(|classes| {
            classes
                .split_ascii_whitespace()
                .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
        })
    }

    fn imported_part(&self, _name: &Ident) -> Option<Ident> {
        None
    }

    fn is_part(&self, _name: &Ident) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.node
            .children
            .iter()
            .filter_map(|id| self.doc.get_node(*id))
            .all(|child| match &child.data {
                NodeData::Element(_) => false,
                NodeData::Text(text) => text.content.is_empty(),
                NodeData::Document | NodeData::Comment => true,
            })
    }

    fn is_root(&self) -> bool {
        self.node
            .parent
            .and_then(|parent| self.doc.get_node(parent))
            .is_some_and(|parent| matches!(parent.data, NodeData::Document))
    }
}
