//! An implementation for Html5ever's sink trait, allowing us to parse HTML into a [`Document`].

use std::borrow::Cow;
use std::cell::{Cell, Ref, RefCell, RefMut};

use html5ever::{
    ParseOpts, QualName,
    tendril::{StrTendril, TendrilSink},
    tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeBuilderOpts, TreeSink},
};

use crate::Document;
use crate::node::Attribute;

/// Convert an html5ever Attribute which uses tendril for its value to an Attribute
/// which uses String.
fn html5ever_to_beacon_attr(attr: html5ever::Attribute) -> Attribute {
    Attribute {
        name: attr.name,
        value: attr.value.to_string(),
    }
}

pub struct DocumentHtmlParser<'doc> {
    doc: RefCell<&'doc mut Document>,

    /// Errors that occurred during parsing.
    pub errors: RefCell<Vec<Cow<'static, str>>>,

    /// The document's quirks mode.
    pub quirks_mode: Cell<QuirksMode>,
}

impl<'doc> DocumentHtmlParser<'doc> {
    #[track_caller]
    /// Get a mutable borrow of the Document
    fn doc_mut(&self) -> RefMut<'_, &'doc mut Document> {
        self.doc.borrow_mut()
    }
}

impl DocumentHtmlParser<'_> {
    pub fn new(doc: &mut Document) -> DocumentHtmlParser<'_> {
        DocumentHtmlParser {
            doc: RefCell::new(doc),
            errors: RefCell::new(Vec::new()),
            quirks_mode: Cell::new(QuirksMode::NoQuirks),
        }
    }

    pub fn parse_into_doc<'d>(doc: &'d mut Document, html: &str) -> &'d mut Document {
        let sink = DocumentHtmlParser::new(doc);
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: false,
                drop_doctype: true,
                ..Default::default()
            },
            ..Default::default()
        };

        if let Err(_err) = html5ever::parse_document(sink, opts)
            .from_utf8()
            .read_from(&mut html.as_bytes())
        {
            #[cfg(feature = "tracing")]
            tracing::error!("Failed to read HTML: {_err}");
        }

        doc
    }
}

impl<'b> TreeSink for DocumentHtmlParser<'b> {
    type Output = ();

    // we use the ID of the nodes in the tree as the handle
    type Handle = usize;

    type ElemName<'a>
        = Ref<'a, QualName>
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        #[cfg(feature = "tracing")]
        for error in self.errors.borrow().iter() {
            tracing::debug!("HTML parse error: {error}");
        }
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.errors.borrow_mut().push(msg);
    }

    fn get_document(&self) -> Self::Handle {
        0
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        Ref::map(self.doc.borrow(), |doc| {
            doc.element_name(*target)
                .expect("TreeSink::elem_name called on a node which is not an element!")
        })
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs.into_iter().map(html5ever_to_beacon_attr).collect();
        self.doc_mut().create_element_with_name(name, attrs)
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        self.doc_mut().create_comment_node()
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        self.doc_mut().create_comment_node()
    }

    fn append(&self, parent_id: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(id) => self.doc_mut().append_children(*parent_id, &[id]),
            // If content to append is text, first attempt to append it to the last child of parent.
            // Else create a new text node and append it to the parent
            NodeOrText::AppendText(text) => {
                let mut doc = self.doc_mut();
                let has_appended = match doc.last_child_id(*parent_id) {
                    Some(id) => doc.append_text_to_node(id, &text).is_ok(),
                    None => false,
                };
                if !has_appended {
                    let new_child_id = doc.create_text_node(&text);
                    doc.append_children(*parent_id, &[new_child_id]);
                }
            }
        }
    }

    // Note: The tree builder promises we won't have a text node after the insertion point.
    fn append_before_sibling(&self, sibling_id: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        match new_node {
            NodeOrText::AppendNode(id) => self.doc_mut().insert_before(*sibling_id, &[id]),
            // If content to append is text, first attempt to append it to the node before sibling_node
            // Else create a new text node and insert it before sibling_node
            NodeOrText::AppendText(text) => {
                let mut doc = self.doc_mut();
                let has_appended = match doc.previous_sibling_id(*sibling_id) {
                    Some(id) => doc.append_text_to_node(id, &text).is_ok(),
                    None => false,
                };
                if !has_appended {
                    let new_child_id = doc.create_text_node(&text);
                    doc.insert_before(*sibling_id, &[new_child_id]);
                }
            }
        };
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.doc.borrow().node_has_parent(*element);
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Ignore. We don't care about the DOCTYPE.
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.quirks_mode.set(mode);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        let attrs = attrs.into_iter().map(html5ever_to_beacon_attr).collect();
        self.doc_mut().add_attrs_if_missing(*target, attrs);
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        let mut doc = self.doc_mut();
        if let Some(parent_id) = doc.get_node(*target).and_then(|node| node.parent) {
            if let Some(parent) = doc.get_node_mut(parent_id) {
                parent.children.retain(|id| id != target);
            }
        }
        if let Some(node) = doc.get_node_mut(*target) {
            node.parent = None;
        }
    }

    fn reparent_children(&self, old_parent_id: &Self::Handle, new_parent_id: &Self::Handle) {
        self.doc_mut()
            .reparent_children(*old_parent_id, *new_parent_id);
    }
}

#[test]
fn parses_some_html() {
    let html = "<!DOCTYPE html><html><body><h1>hello world</h1></body></html>";
    let doc = Document::from_html(html);

    // Now our tree should have some nodes in it
    let h1 = doc.query_selector("html > body > h1").unwrap();
    assert_eq!(doc.text_content(h1), "hello world");
}
