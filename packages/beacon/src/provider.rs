use std::borrow::Cow;
use std::rc::Rc;

use beacon_traits::{Dom, DomEvent, EventHandler, NodeId, Transport};
use rustc_hash::FxHashMap;

use crate::condition::{Condition, parse_condition};
use crate::PushContext;

/// Builds the raw handler for one element, or declines with `None`.
pub type HandlerBuilder = Box<dyn Fn(&PushContext, &dyn Dom, NodeId) -> Option<EventHandler>>;

/// An analytics backend.
///
/// Beacon asks a provider to handle every element declaring an event. The provider reads its
/// [`method_attribute`](Provider::method_attribute) off the element and looks the declared method
/// up in its [`MethodTable`].
pub trait Provider {
    /// Display name
    fn name(&self) -> &str;

    /// Unique key within a registry
    fn short_name(&self) -> &str;

    /// The attribute selecting which of [`methods`](Provider::methods) handles an element
    fn method_attribute(&self) -> &str;

    /// The analytics object payloads are pushed to, if it is available.
    fn resolve_transport(&self) -> Option<Rc<dyn Transport>> {
        None
    }

    fn methods(&self) -> &MethodTable;
}

/// `record` -> `Record`
pub fn title_case(method: &str) -> Cow<'_, str> {
    let mut chars = method.chars();
    match chars.next() {
        Some(first) if !first.is_uppercase() => {
            Cow::Owned(first.to_uppercase().chain(chars).collect())
        }
        _ => Cow::Borrowed(method),
    }
}

/// Handler builders keyed by declared method name. Names are title-cased on the way in and on
/// lookup, so `record` and `Record` select the same builder.
#[derive(Default)]
pub struct MethodTable {
    builders: FxHashMap<String, HandlerBuilder>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        method: &str,
        builder: impl Fn(&PushContext, &dyn Dom, NodeId) -> Option<EventHandler> + 'static,
    ) -> Self {
        self.insert(method, builder);
        self
    }

    pub fn insert(
        &mut self,
        method: &str,
        builder: impl Fn(&PushContext, &dyn Dom, NodeId) -> Option<EventHandler> + 'static,
    ) {
        self.builders
            .insert(title_case(method).into_owned(), Box::new(builder));
    }

    pub fn get(&self, method: &str) -> Option<&HandlerBuilder> {
        self.builders.get(title_case(method).as_ref())
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

enum Guard {
    Always,
    When(Condition),
    /// The condition could not be parsed: the handler never fires
    Never,
}

impl PushContext {
    /// Build the handler this context's provider attaches to `element`.
    ///
    /// Declines when the element has no method attribute for the provider, or when the declared
    /// method has no builder. `condition` is parsed once here and evaluated every time the
    /// handler fires, against the element the handler runs for.
    pub fn build_handler(
        &self,
        dom: &dyn Dom,
        element: NodeId,
        condition: Option<&str>,
    ) -> Option<EventHandler> {
        let provider = self.provider();
        let method = dom
            .attr(element, provider.method_attribute())
            .filter(|method| !method.is_empty())?;

        let Some(builder) = provider.methods().get(method) else {
            self.log().warn(format_args!(
                "No handler can be built for node {element}: method {} is not supported",
                title_case(method)
            ));
            return None;
        };
        let raw = builder(self, dom, element)?;

        let guard = match condition.map(str::trim).filter(|c| !c.is_empty()) {
            None => Guard::Always,
            Some(source) => match parse_condition(source, self.log()) {
                Some(condition) => Guard::When(condition),
                None => Guard::Never,
            },
        };
        if matches!(guard, Guard::Always) {
            return Some(raw);
        }

        let cx = self.clone();
        Some(Rc::new(move |dom: &dyn Dom, event: &DomEvent| {
            let target = event.current_target;
            let pass = match &guard {
                Guard::Always => true,
                Guard::When(condition) => condition.evaluate(dom, target, cx.log()),
                Guard::Never => false,
            };
            if pass {
                raw(dom, event);
            } else {
                cx.log().info(format_args!(
                    "{} event on node {target} will not be pushed due to its condition",
                    event.name()
                ));
            }
        }))
    }
}
