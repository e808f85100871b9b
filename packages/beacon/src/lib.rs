//! Declarative analytics bindings.
//!
//! Markup declares what to track:
//!
//! ```html
//! <a href="/pricing"
//!    data-metric-event="click"
//!    data-ga-method="event"
//!    data-ga-category="'nav'"
//!    data-ga-label="text"
//!    data-metric-condition="attr(class !contains disabled)">Pricing</a>
//! ```
//!
//! A [`Registry`] holds [`Provider`]s (one per analytics backend). Adding a provider scans the
//! document for elements declaring an event, asks the provider to build a handler for each of
//! them, and attaches it through the [`Dom`](beacon_traits::Dom) port. When the event fires the
//! handler checks the element's condition, extracts its data and pushes a payload to the
//! provider's [`Transport`](beacon_traits::Transport).
//!
//! Values inside provider attributes use the extractor grammar ([`extractor`]), conditions use
//! the condition grammar ([`condition`]).

mod binder;
pub mod condition;
mod config;
mod diagnostics;
pub mod extractor;
mod provider;
mod push;
mod registry;

pub use beacon_traits::{Dom, DomEvent, EventHandler, ListenerId, NodeId, Payload, Transport};
pub use binder::{Binder, Binding};
pub use condition::{Condition, Operator, parse_condition};
pub use config::{Config, Settings};
pub use diagnostics::Diagnostics;
pub use extractor::{Extractor, ExtractorKind, extract_value, parse_extractor};
pub use provider::{HandlerBuilder, MethodTable, Provider, title_case};
pub use push::{PushContext, PushData};
pub use registry::Registry;
