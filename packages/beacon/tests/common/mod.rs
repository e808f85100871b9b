//! Providers and transports shared by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use beacon::{
    Dom, DomEvent, EventHandler, MethodTable, NodeId, Payload, Provider, PushContext, PushData,
    Transport,
};
use serde_json::{Map, Value, json};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Remembers everything pushed to it
#[derive(Default)]
pub struct RecordingTransport {
    pushed: RefCell<Vec<Payload>>,
}

impl RecordingTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn pushed(&self) -> Vec<Payload> {
        self.pushed.borrow().clone()
    }

    pub fn clear(&self) {
        self.pushed.borrow_mut().clear();
    }
}

impl Transport for RecordingTransport {
    fn push(&self, payload: Payload) {
        self.pushed.borrow_mut().push(payload);
    }
}

/// A provider with a single `test` method pushing `["test", <short name>]`.
pub struct TestProvider {
    short_name: String,
    method_attribute: String,
    transport: Option<Rc<RecordingTransport>>,
    /// How many times a raw handler of this provider ran
    fired: Rc<Cell<usize>>,
    methods: MethodTable,
}

impl TestProvider {
    pub fn new(short_name: &str, transport: Option<Rc<RecordingTransport>>) -> Rc<Self> {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let methods = MethodTable::new().with("test", move |cx, _dom, _element| {
            let push = cx.push_handler(json!(["test", cx.provider().short_name()]));
            let counter = counter.clone();
            let handler: EventHandler = Rc::new(move |dom: &dyn Dom, event: &DomEvent| {
                counter.set(counter.get() + 1);
                push(dom, event);
            });
            Some(handler)
        });
        Rc::new(Self {
            short_name: short_name.to_string(),
            method_attribute: format!("data-{short_name}-method"),
            transport,
            fired,
            methods,
        })
    }

    pub fn fired(&self) -> usize {
        self.fired.get()
    }
}

impl Provider for TestProvider {
    fn name(&self) -> &str {
        "Test provider"
    }

    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn method_attribute(&self) -> &str {
        &self.method_attribute
    }

    fn resolve_transport(&self) -> Option<Rc<dyn Transport>> {
        let transport = self.transport.clone()?;
        Some(transport)
    }

    fn methods(&self) -> &MethodTable {
        &self.methods
    }
}

/// Shaped like a Google Analytics adapter: `event` and `social` methods.
pub struct GaLike {
    transport: Rc<RecordingTransport>,
    methods: MethodTable,
}

impl GaLike {
    pub fn new(transport: Rc<RecordingTransport>) -> Rc<Self> {
        let methods = MethodTable::new()
            .with("event", track_event)
            .with("social", track_social);
        Rc::new(Self { transport, methods })
    }
}

fn track_event(cx: &PushContext, dom: &dyn Dom, element: NodeId) -> Option<EventHandler> {
    let Some(category) = dom.attr(element, "data-gaq-category") else {
        cx.log()
            .warn(format_args!("Attribute data-gaq-category is required"));
        return None;
    };
    let category = category.to_string();
    let action = dom.attr(element, "data-gaq-action")?.to_string();
    let label = dom.attr(element, "data-gaq-label").map(str::to_string);
    let value = dom.attr(element, "data-gaq-value").map(str::to_string);

    let extractor = cx.clone();
    Some(cx.push_handler(PushData::deferred(move |dom, event| {
        let extract = |source: &Option<String>| {
            source
                .as_deref()
                .and_then(|source| extractor.extract_value(dom, event.current_target, source))
        };
        json!(["_trackEvent", category, action, extract(&label), extract(&value)])
    })))
}

fn track_social(cx: &PushContext, dom: &dyn Dom, element: NodeId) -> Option<EventHandler> {
    let network = dom.attr(element, "data-gaq-network")?;
    let action = dom.attr(element, "data-gaq-action")?;
    let target = dom.attr(element, "data-gaq-target");
    Some(cx.push_handler(json!(["_trackSocial", network, action, target])))
}

impl Provider for GaLike {
    fn name(&self) -> &str {
        "Google Analytics"
    }

    fn short_name(&self) -> &str {
        "GA"
    }

    fn method_attribute(&self) -> &str {
        "data-gaq-method"
    }

    fn resolve_transport(&self) -> Option<Rc<dyn Transport>> {
        Some(self.transport.clone())
    }

    fn methods(&self) -> &MethodTable {
        &self.methods
    }
}

/// Shaped like a KissMetrics adapter: `record` with `key => value` properties.
pub struct KmLike {
    transport: Rc<RecordingTransport>,
    methods: MethodTable,
}

impl KmLike {
    pub fn new(transport: Rc<RecordingTransport>) -> Rc<Self> {
        let methods = MethodTable::new().with("record", record);
        Rc::new(Self { transport, methods })
    }
}

fn record(cx: &PushContext, dom: &dyn Dom, element: NodeId) -> Option<EventHandler> {
    let name = dom.attr(element, "data-kmq-name")?.to_string();
    let properties = dom
        .attr(element, "data-kmq-properties")
        .unwrap_or_default()
        .to_string();

    let extractor = cx.clone();
    Some(cx.push_handler(PushData::deferred(move |dom, event| {
        let mut props = Map::new();
        for property in properties.split(',') {
            let Some((key, source)) = property.split_once("=>") else {
                continue;
            };
            let value = extractor.extract_value(dom, event.current_target, source.trim());
            props.insert(key.trim().to_string(), value.map_or(Value::Null, Value::String));
        }
        json!(["record", name, props])
    })))
}

impl Provider for KmLike {
    fn name(&self) -> &str {
        "KissMetrics"
    }

    fn short_name(&self) -> &str {
        "KM"
    }

    fn method_attribute(&self) -> &str {
        "data-kmq-method"
    }

    fn resolve_transport(&self) -> Option<Rc<dyn Transport>> {
        Some(self.transport.clone())
    }

    fn methods(&self) -> &MethodTable {
        &self.methods
    }
}
