use crate::EventHandler;

/// Identifies a node within a [`Dom`]. Ids are stable for the lifetime of the node.
pub type NodeId = usize;

/// Identifies one attached listener so that it can later be detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The DOM capabilities Beacon consumes.
///
/// Selection methods take CSS selector strings. An implementation that cannot parse a selector
/// should treat it as matching nothing rather than fail.
pub trait Dom {
    /// All elements in the document matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<NodeId>;

    /// All strict descendants of `scope` matching `selector`, in document order.
    fn find(&self, scope: NodeId, selector: &str) -> Vec<NodeId>;

    /// The value of attribute `name` on `node`, if `node` is an element carrying it.
    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;

    /// The concatenated text of all text nodes below `node`.
    fn text(&self, node: NodeId) -> String;

    /// Attach `handler` directly to `node` for events of type `event_type`.
    fn bind(&mut self, node: NodeId, event_type: &str, handler: EventHandler) -> ListenerId;

    /// Detach a listener previously attached with [`Dom::bind`].
    fn unbind(&mut self, node: NodeId, event_type: &str, listener: ListenerId);

    /// Attach `handler` to `node` so that it fires for events of type `event_type` whose path
    /// passes through a descendant of `node` matching `selector`.
    fn delegate(
        &mut self,
        node: NodeId,
        selector: &str,
        event_type: &str,
        handler: EventHandler,
    ) -> ListenerId;

    /// Detach a listener previously attached with [`Dom::delegate`].
    fn undelegate(&mut self, node: NodeId, selector: &str, event_type: &str, listener: ListenerId);
}
