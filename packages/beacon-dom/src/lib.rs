//! An in-memory DOM for Beacon
//!
//! This crate implements a small headless DOM ([`Document`]) that satisfies the
//! [`Dom`](beacon_traits::Dom) port: HTML parsing via html5ever, CSS selector queries, attribute
//! and text reads, and direct/delegated event listeners with bubbling dispatch.
//!
//! It is what Beacon's own tests run against, and a reasonable starting point for embedders that
//! keep their markup in Rust (server-side rendering, headless testing of analytics markup).

/// The DOM implementation.
///
/// This is the primary entry point for this crate.
mod document;

/// The nodes themselves, and their data.
pub mod node;

mod events;
mod html;
pub mod selector;

pub use document::{AppendTextErr, Document};
pub use html::DocumentHtmlParser;
pub use markup5ever::{LocalName, Namespace, QualName, ns};
pub use node::{Attribute, ElementData, Node, NodeData, TextNodeData};
pub use selector::{SelectorError, SelectorList};
