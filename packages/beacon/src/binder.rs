use beacon_traits::{Dom, ListenerId, NodeId};
use indexmap::IndexMap;

use crate::{Config, Diagnostics, PushContext};

/// One listener attached on behalf of a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub element: NodeId,
    pub event_type: String,
    /// The delegation selector, for delegated bindings
    pub selector: Option<String>,
    pub listener: ListenerId,
}

/// A registered provider together with the bindings attached for it
pub(crate) struct ProviderEntry {
    pub(crate) context: PushContext,
    pub(crate) bindings: Vec<Binding>,
}

impl ProviderEntry {
    pub(crate) fn new(context: PushContext) -> Self {
        Self {
            context,
            bindings: Vec::new(),
        }
    }

    fn detach_all(&mut self, dom: &mut dyn Dom) {
        for binding in self.bindings.drain(..) {
            match &binding.selector {
                Some(selector) => {
                    dom.undelegate(binding.element, selector, &binding.event_type, binding.listener)
                }
                None => dom.unbind(binding.element, &binding.event_type, binding.listener),
            }
        }
    }
}

/// The event an element declares: a bare event type, or `... selector event` for delegation.
fn parse_declared_event(value: &str) -> Option<(&str, Option<&str>)> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    match tokens[..] {
        [] => None,
        [event_type] => Some((event_type, None)),
        [.., selector, event_type] => Some((event_type, Some(selector))),
    }
}

/// Scans markup for declared events and attaches providers' handlers to it.
pub struct Binder<'a> {
    providers: &'a mut IndexMap<String, ProviderEntry>,
    config: &'a Config,
    log: &'a Diagnostics,
    dom: &'a mut dyn Dom,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(
        providers: &'a mut IndexMap<String, ProviderEntry>,
        config: &'a Config,
        log: &'a Diagnostics,
        dom: &'a mut dyn Dom,
    ) -> Self {
        Self {
            providers,
            config,
            log,
            dom,
        }
    }

    /// Bind every registered provider to the declared events below `root` (the whole document
    /// when `None`). Returns the number of bindings attached.
    ///
    /// Parsing the same markup twice binds it twice.
    pub fn parse(&mut self, root: Option<NodeId>) -> usize {
        self.scan(root, None)
    }

    /// Like [`Binder::parse`], for a single provider
    pub fn parse_for(&mut self, short_name: &str, root: Option<NodeId>) -> usize {
        self.scan(root, Some(short_name))
    }

    fn scan(&mut self, root: Option<NodeId>, only: Option<&str>) -> usize {
        let config = self.config;
        let event_attribute = config.event_attribute.as_str();
        let selector = format!("[{event_attribute}]");
        let elements = match root {
            Some(root) => self.dom.find(root, &selector),
            None => self.dom.query_selector_all(&selector),
        };

        let mut attached = 0;
        for element in elements {
            let Some(declared) = self.dom.attr(element, event_attribute) else {
                continue;
            };
            let Some((event_type, delegate_to)) = parse_declared_event(declared) else {
                self.log
                    .warn(format_args!("Node {element} declares an empty event"));
                continue;
            };
            let event_type = event_type.to_string();
            let delegate_to = delegate_to.map(str::to_string);
            let condition = self
                .dom
                .attr(element, &config.condition_attribute)
                .map(str::to_string);

            self.log.info(format_args!(
                "Binding analytics handlers for node {element} on {event_type}"
            ));

            for (short_name, entry) in self.providers.iter_mut() {
                if only.is_some_and(|only| only != short_name.as_str()) {
                    continue;
                }
                let Some(handler) =
                    entry
                        .context
                        .build_handler(&*self.dom, element, condition.as_deref())
                else {
                    continue;
                };
                let listener = match &delegate_to {
                    Some(selector) => self.dom.delegate(element, selector, &event_type, handler),
                    None => self.dom.bind(element, &event_type, handler),
                };
                entry.bindings.push(Binding {
                    element,
                    event_type: event_type.clone(),
                    selector: delegate_to.clone(),
                    listener,
                });
                attached += 1;
            }
        }
        attached
    }

    /// Detach the bindings of the provider named `short_name`, or of every provider.
    pub fn unbind(&mut self, short_name: Option<&str>) {
        match short_name {
            Some(short_name) => {
                if let Some(entry) = self.providers.get_mut(short_name) {
                    entry.detach_all(self.dom);
                }
            }
            None => {
                for entry in self.providers.values_mut() {
                    entry.detach_all(self.dom);
                }
            }
        }
    }
}
