use std::rc::Rc;

use beacon_traits::{Dom, DomEvent, EventHandler, NodeId, Payload, Transport};

use crate::{Diagnostics, Provider, Settings, extractor};

/// What a push handler sends: a fixed payload, or one computed from the DOM when the event fires.
#[derive(Clone)]
pub enum PushData {
    Literal(Payload),
    Deferred(Rc<dyn Fn(&dyn Dom, &DomEvent) -> Payload>),
}

impl PushData {
    pub fn deferred(f: impl Fn(&dyn Dom, &DomEvent) -> Payload + 'static) -> Self {
        PushData::Deferred(Rc::new(f))
    }

    fn resolve(&self, dom: &dyn Dom, event: &DomEvent) -> Payload {
        match self {
            PushData::Literal(payload) => payload.clone(),
            PushData::Deferred(f) => f(dom, event),
        }
    }
}

impl From<Payload> for PushData {
    fn from(payload: Payload) -> Self {
        PushData::Literal(payload)
    }
}

/// Stands in for a provider whose analytics object cannot be resolved
struct MissingTransport {
    log: Diagnostics,
}

impl Transport for MissingTransport {
    fn push(&self, _payload: Payload) {
        self.log.warn(format_args!("Analytics object not defined!"));
    }
}

/// The shared capabilities handed to a provider's handler builders: the push pipeline, value
/// extraction and provider-scoped logging.
#[derive(Clone)]
pub struct PushContext {
    provider: Rc<dyn Provider>,
    settings: Rc<Settings>,
    log: Diagnostics,
}

impl PushContext {
    pub fn new(provider: Rc<dyn Provider>, settings: Rc<Settings>) -> Self {
        let log = Diagnostics::new(settings.clone(), provider.short_name());
        Self {
            provider,
            settings,
            log,
        }
    }

    pub fn provider(&self) -> &Rc<dyn Provider> {
        &self.provider
    }

    pub fn log(&self) -> &Diagnostics {
        &self.log
    }

    /// Send `payload` to the provider's transport, unless pushing is disabled.
    pub fn push(&self, payload: Payload) {
        self.log.info(format_args!("pushing -> {payload}"));
        if !self.settings.enabled() {
            self.log.warn(format_args!("Push is not enabled!"));
            return;
        }

        match self.provider.resolve_transport() {
            Some(transport) => transport.push(payload),
            None => MissingTransport {
                log: self.log.clone(),
            }
            .push(payload),
        }
    }

    /// A handler that pushes `data` every time it fires. Deferred data is computed at fire time.
    pub fn push_handler(&self, data: impl Into<PushData>) -> EventHandler {
        let cx = self.clone();
        let data = data.into();
        Rc::new(move |dom: &dyn Dom, event: &DomEvent| {
            cx.push(data.resolve(dom, event));
        })
    }

    /// See [`extractor::extract_value`]. Logs through this provider.
    pub fn extract_value(&self, dom: &dyn Dom, scope: NodeId, value: &str) -> Option<String> {
        extractor::extract_value(dom, Some(scope), value, &self.log)
    }
}
