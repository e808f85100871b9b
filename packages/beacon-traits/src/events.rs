use std::rc::Rc;

use smol_str::SmolStr;

use crate::{Dom, NodeId};

/// A listener callback. It receives read access to the DOM the event is being dispatched in.
pub type EventHandler = Rc<dyn Fn(&dyn Dom, &DomEvent)>;

#[derive(Debug, Clone)]
pub struct DomEvent {
    /// The event name ("click", "submit", ...)
    pub event_type: SmolStr,
    /// The node the event was originally dispatched to.
    pub target: NodeId,
    /// The node the running listener is attached to. For delegated listeners this is the
    /// descendant that matched the delegation selector.
    pub current_target: NodeId,
}

impl DomEvent {
    pub fn new(event_type: impl Into<SmolStr>, target: NodeId) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            current_target: target,
        }
    }

    /// A copy of this event as seen by a listener running on `current_target`.
    pub fn with_current_target(&self, current_target: NodeId) -> Self {
        Self {
            current_target,
            ..self.clone()
        }
    }

    /// Returns the name of the event ("click", "mouseover", "keypress", etc)
    pub fn name(&self) -> &str {
        &self.event_type
    }
}
