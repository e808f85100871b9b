use beacon_traits::{DomEvent, EventHandler};

use crate::Document;
use crate::selector::matches_selector_list;

impl Document {
    /// Dispatch an event of type `event_type` at `target` and let it bubble up to the document.
    ///
    /// At each node on the way up, delegated listeners run first (once for every node between
    /// the target and the listening node that matches the delegation selector, starting at the
    /// target), followed by direct listeners. Listeners run in registration order.
    ///
    /// Returns the number of listener invocations.
    pub fn dispatch(&self, target: usize, event_type: &str) -> usize {
        let event = DomEvent::new(event_type, target);
        let chain = self.node_chain(target);

        // Collect first so that listeners observe a stable snapshot of the tree
        let mut queue: Vec<(EventHandler, usize)> = Vec::new();
        for (depth, &node_id) in chain.iter().enumerate() {
            let listeners: Vec<_> = self.nodes[node_id]
                .listeners
                .iter()
                .filter(|listener| listener.event_type == event_type)
                .collect();
            if listeners.is_empty() {
                continue;
            }

            for &current in &chain[..depth] {
                for listener in &listeners {
                    let Some(delegation) = &listener.delegation else {
                        continue;
                    };
                    let matched = delegation
                        .selector
                        .as_ref()
                        .is_some_and(|selector| matches_selector_list(self, current, selector));
                    if matched {
                        queue.push((listener.handler.clone(), current));
                    }
                }
            }

            for listener in listeners.iter().filter(|l| l.delegation.is_none()) {
                queue.push((listener.handler.clone(), node_id));
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            "Dispatching {event_type} at node {target} to {} listeners",
            queue.len()
        );

        let count = queue.len();
        for (handler, current_target) in queue {
            handler(self, &event.with_current_target(current_target));
        }
        count
    }

    /// Shorthand for dispatching a `click` event
    pub fn click(&self, target: usize) -> usize {
        self.dispatch(target, "click")
    }
}
