use beacon_traits::{Dom, EventHandler, ListenerId, NodeId};
use markup5ever::{LocalName, QualName, ns};
use slab::Slab;
use smallvec::SmallVec;

use crate::html::DocumentHtmlParser;
use crate::node::{Attribute, Delegation, ElementData, Listener, Node, NodeData, TextNodeData};
use crate::selector::{SelectorList, matches_selector_list, parse_selector_list};

pub enum AppendTextErr {
    /// The node is not a text node
    NotTextNode,
}

/// An in-memory DOM tree.
///
/// Node 0 is always the document node. Node ids are slab keys and stay valid until the node is
/// removed.
pub struct Document {
    /// A slab-backed tree of nodes
    pub(crate) nodes: Slab<Node>,
    next_listener_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document containing only the document node
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Slab::new(),
            next_listener_id: 0,
        };
        doc.create_node(NodeData::Document);
        doc
    }

    /// Parse HTML into a new [`Document`]
    pub fn from_html(html: &str) -> Self {
        let mut doc = Self::new();
        DocumentHtmlParser::parse_into_doc(&mut doc, html);
        doc
    }

    pub fn get_node(&self, node_id: usize) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn get_node_mut(&mut self, node_id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    pub fn create_node(&mut self, node_data: NodeData) -> usize {
        let entry = self.nodes.vacant_entry();
        let id = entry.key();
        entry.insert(Node::new(id, node_data));
        id
    }

    pub fn create_text_node(&mut self, text: &str) -> usize {
        self.create_node(NodeData::Text(TextNodeData::new(text.to_string())))
    }

    pub fn create_comment_node(&mut self) -> usize {
        self.create_node(NodeData::Comment)
    }

    /// Create a detached HTML element with the given tag name and attributes
    pub fn create_element(&mut self, tag_name: &str, attrs: &[(&str, &str)]) -> usize {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: attr_name(name),
                value: value.to_string(),
            })
            .collect();
        self.create_element_with_name(html_name(tag_name), attrs)
    }

    pub fn create_element_with_name(&mut self, name: QualName, attrs: Vec<Attribute>) -> usize {
        self.create_node(NodeData::Element(ElementData::new(name, attrs)))
    }

    pub fn element_name(&self, node_id: usize) -> Option<&QualName> {
        self.nodes[node_id].element_data().map(|el| &el.name)
    }

    pub fn node_has_parent(&self, node_id: usize) -> bool {
        self.nodes[node_id].parent.is_some()
    }

    pub fn last_child_id(&self, node_id: usize) -> Option<usize> {
        self.nodes[node_id].children.last().copied()
    }

    pub fn previous_sibling_id(&self, node_id: usize) -> Option<usize> {
        let parent = &self.nodes[self.nodes[node_id].parent?];
        let idx = parent.index_of_child(node_id)?;
        idx.checked_sub(1).map(|idx| parent.children[idx])
    }

    /// Detach `node_id` from its current parent, if it has one
    fn detach(&mut self, node_id: usize) {
        if let Some(old_parent_id) = self.nodes[node_id].parent.take() {
            self.nodes[old_parent_id]
                .children
                .retain(|id| *id != node_id);
        }
    }

    pub fn append_children(&mut self, parent_id: usize, child_ids: &[usize]) {
        for child_id in child_ids.iter().copied() {
            self.detach(child_id);
            self.nodes[parent_id].children.push(child_id);
            self.nodes[child_id].parent = Some(parent_id);
        }
    }

    pub fn insert_before(&mut self, anchor_id: usize, new_node_ids: &[usize]) {
        let Some(parent_id) = self.nodes[anchor_id].parent else {
            return;
        };
        for new_node_id in new_node_ids.iter().copied() {
            self.detach(new_node_id);
            let idx = self.nodes[parent_id]
                .index_of_child(anchor_id)
                .unwrap_or(self.nodes[parent_id].children.len());
            self.nodes[parent_id].children.insert(idx, new_node_id);
            self.nodes[new_node_id].parent = Some(parent_id);
        }
    }

    /// Remove all of the children from old_parent_id and append them to new_parent_id
    pub fn reparent_children(&mut self, old_parent_id: usize, new_parent_id: usize) {
        let child_ids = std::mem::take(&mut self.nodes[old_parent_id].children);
        for child_id in &child_ids {
            self.nodes[*child_id].parent = None;
        }
        self.append_children(new_parent_id, &child_ids);
    }

    /// Detach a node from the tree and drop it together with its subtree (and their listeners)
    pub fn remove_node(&mut self, node_id: usize) {
        fn remove_ignoring_parent(doc: &mut Document, node_id: usize) {
            if let Some(node) = doc.nodes.try_remove(node_id) {
                for child in node.children {
                    remove_ignoring_parent(doc, child);
                }
            }
        }

        if node_id == 0 || !self.nodes.contains(node_id) {
            return;
        }
        self.detach(node_id);
        remove_ignoring_parent(self, node_id);
    }

    pub fn append_text_to_node(&mut self, node_id: usize, text: &str) -> Result<(), AppendTextErr> {
        match self.nodes[node_id].text_data_mut() {
            Some(data) => {
                data.content += text;
                Ok(())
            }
            None => Err(AppendTextErr::NotTextNode),
        }
    }

    pub fn set_attribute(&mut self, node_id: usize, name: &str, value: &str) {
        if let Some(element) = self.nodes[node_id].element_data_mut() {
            element.attrs.set(attr_name(name), value);
        }
    }

    pub fn remove_attribute(&mut self, node_id: usize, name: &str) {
        if let Some(element) = self.nodes[node_id].element_data_mut() {
            element.attrs.remove(name);
        }
    }

    pub fn add_attrs_if_missing(&mut self, node_id: usize, attrs: Vec<Attribute>) {
        let Some(element) = self.nodes[node_id].element_data_mut() else {
            return;
        };
        for attr in attrs {
            if !element.attrs.iter().any(|existing| existing.name == attr.name) {
                element.attrs.push(attr);
            }
        }
    }

    /// Parse `html` and append the resulting nodes to `parent_id`.
    ///
    /// Returns the ids of the appended top-level nodes.
    pub fn append_html(&mut self, parent_id: usize, html: &str) -> Vec<usize> {
        let fragment = Document::from_html(html);
        let Some(body_id) = fragment.query_selector("body") else {
            return Vec::new();
        };

        let imported: Vec<usize> = fragment.nodes[body_id]
            .children
            .iter()
            .map(|child_id| self.import_node(&fragment, *child_id))
            .collect();
        self.append_children(parent_id, &imported);
        imported
    }

    /// Deep copy a node (without listeners) from another document into this one
    fn import_node(&mut self, other: &Document, other_id: usize) -> usize {
        let other_node = &other.nodes[other_id];
        let id = self.create_node(other_node.data.clone());
        let children: Vec<usize> = other_node
            .children
            .iter()
            .map(|child_id| self.import_node(other, *child_id))
            .collect();
        self.append_children(id, &children);
        id
    }

    /// The chain of nodes from `node_id` up to and including the document node
    pub fn node_chain(&self, node_id: usize) -> Vec<usize> {
        let mut chain = Vec::with_capacity(16);
        let mut next_node_id = Some(node_id);
        while let Some(id) = next_node_id {
            let Some(node) = self.nodes.get(id) else {
                break;
            };
            chain.push(id);
            next_node_id = node.parent;
        }
        chain
    }

    /// All descendants of `node_id` (excluding itself) in document order
    pub fn descendants(&self, node_id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: SmallVec<[usize; 32]> = SmallVec::new();
        if let Some(node) = self.nodes.get(node_id) {
            stack.extend(node.children.iter().rev().copied());
        }
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        out
    }

    pub fn text_content(&self, node_id: usize) -> String {
        let mut out = String::new();
        self.write_text_content(node_id, &mut out);
        out
    }

    fn write_text_content(&self, node_id: usize, out: &mut String) {
        let Some(node) = self.nodes.get(node_id) else {
            return;
        };
        match &node.data {
            NodeData::Text(data) => out.push_str(&data.content),
            NodeData::Element(..) | NodeData::Document => {
                for child_id in node.children.iter() {
                    self.write_text_content(*child_id, out);
                }
            }
            NodeData::Comment => {}
        }
    }

    pub(crate) fn try_parse_selector_list(&self, selector: &str) -> Option<SelectorList> {
        match parse_selector_list(selector) {
            Ok(list) => Some(list),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Invalid selector {selector:?}: {_err}");
                None
            }
        }
    }

    /// Whether `node_id` matches the selector specified as a string
    pub fn matches(&self, node_id: usize, selector: &str) -> bool {
        self.try_parse_selector_list(selector)
            .is_some_and(|list| matches_selector_list(self, node_id, &list))
    }

    /// Find the first element that matches the selector specified as a string
    pub fn query_selector(&self, selector: &str) -> Option<usize> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// Find all descendants of `scope` that match the selector, in document order
    pub fn query_selector_all_in(&self, scope: usize, selector: &str) -> Vec<usize> {
        let Some(list) = self.try_parse_selector_list(selector) else {
            return Vec::new();
        };
        self.descendants(scope)
            .into_iter()
            .filter(|id| matches_selector_list(self, *id, &list))
            .collect()
    }

    /// Find the first element whose `id` attribute equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<usize> {
        self.descendants(0)
            .into_iter()
            .find(|node_id| self.nodes[*node_id].attr("id") == Some(id))
    }

    /// Number of listeners attached to `node_id`
    pub fn listener_count(&self, node_id: usize) -> usize {
        self.nodes.get(node_id).map_or(0, Node::listener_count)
    }

    /// Total number of listeners attached anywhere in the document
    pub fn total_listener_count(&self) -> usize {
        self.nodes.iter().map(|(_, node)| node.listener_count()).sum()
    }

    fn add_listener(
        &mut self,
        node_id: usize,
        event_type: &str,
        delegation: Option<Delegation>,
        handler: EventHandler,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;

        match self.nodes.get_mut(node_id) {
            Some(node) => node.listeners.push(Listener {
                id,
                event_type: event_type.into(),
                delegation,
                handler,
            }),
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Cannot attach listener to missing node {node_id}");
            }
        }
        id
    }

    fn remove_listener(
        &mut self,
        node_id: usize,
        event_type: &str,
        selector: Option<&str>,
        listener: ListenerId,
    ) {
        let Some(node) = self.nodes.get_mut(node_id) else {
            return;
        };
        node.listeners.retain(|l| {
            let same_selector = l.delegation.as_ref().map(|d| d.source.as_str()) == selector;
            !(l.id == listener && l.event_type == event_type && same_selector)
        });
    }
}

fn html_name(local: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(local))
}

fn attr_name(local: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(local))
}

impl Dom for Document {
    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.query_selector_all_in(0, selector)
    }

    fn find(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        self.query_selector_all_in(scope, selector)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node)?.attr(name)
    }

    fn text(&self, node: NodeId) -> String {
        self.text_content(node)
    }

    fn bind(&mut self, node: NodeId, event_type: &str, handler: EventHandler) -> ListenerId {
        self.add_listener(node, event_type, None, handler)
    }

    fn unbind(&mut self, node: NodeId, event_type: &str, listener: ListenerId) {
        self.remove_listener(node, event_type, None, listener);
    }

    fn delegate(
        &mut self,
        node: NodeId,
        selector: &str,
        event_type: &str,
        handler: EventHandler,
    ) -> ListenerId {
        let delegation = Delegation {
            source: selector.to_string(),
            selector: self.try_parse_selector_list(selector),
        };
        self.add_listener(node, event_type, Some(delegation), handler)
    }

    fn undelegate(&mut self, node: NodeId, selector: &str, event_type: &str, listener: ListenerId) {
        self.remove_listener(node, event_type, Some(selector), listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_html_into_a_tree() {
        let doc = Document::from_html(
            r#"<div class="container"><span data-value="foo bar">foo <b>bar</b></span></div>"#,
        );
        let span = doc.query_selector(".container span").unwrap();
        assert_eq!(Dom::attr(&doc, span, "data-value"), Some("foo bar"));
        assert_eq!(doc.text(span), "foo bar");
        assert!(doc.query_selector("em").is_none());
    }

    #[test]
    fn find_excludes_the_scope_itself() {
        let doc = Document::from_html(r#"<div class="x"><div class="x"></div></div>"#);
        let outer = doc.query_selector(".x").unwrap();
        assert_eq!(doc.query_selector_all(".x").len(), 2);
        assert_eq!(doc.find(outer, ".x").len(), 1);
    }

    #[test]
    fn append_html_grafts_nodes() {
        let mut doc = Document::from_html(r#"<div class="container"></div>"#);
        let container = doc.query_selector(".container").unwrap();
        let added = doc.append_html(container, r#"<a class="dynamic" href="/go">go</a><p>x</p>"#);
        assert_eq!(added.len(), 2);
        let a = doc.query_selector(".container > a.dynamic").unwrap();
        assert_eq!(a, added[0]);
        assert_eq!(doc.text(a), "go");
    }

    #[test]
    fn remove_node_drops_subtree() {
        let mut doc = Document::from_html(r#"<ul><li><a>x</a></li></ul>"#);
        let li = doc.query_selector("li").unwrap();
        let a = doc.query_selector("a").unwrap();
        doc.remove_node(li);
        assert!(doc.get_node(li).is_none());
        assert!(doc.get_node(a).is_none());
        assert!(doc.query_selector("ul li").is_none());
    }

    #[test]
    fn attributes_can_be_changed() {
        let mut doc = Document::from_html(r#"<span class="inactive"></span>"#);
        let span = doc.query_selector("span").unwrap();
        doc.set_attribute(span, "class", "active");
        doc.set_attribute(span, "data-x", "1");
        assert!(doc.matches(span, ".active[data-x=\"1\"]"));
        doc.remove_attribute(span, "data-x");
        assert_eq!(Dom::attr(&doc, span, "data-x"), None);
    }
}
