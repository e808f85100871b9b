//! Shared types for Beacon.
//!
//! Beacon never talks to a concrete DOM or a concrete analytics backend. Instead it consumes the
//! small set of capabilities defined here: the [`Dom`] port (selection, attribute/text reads and
//! listener management) and the [`Transport`] port (a single `push`). Embedders implement these
//! for their environment; `beacon-dom` ships an in-memory implementation of [`Dom`].

mod dom;
pub use dom::{Dom, ListenerId, NodeId};

mod events;
pub use events::{DomEvent, EventHandler};

mod transport;
pub use transport::{Payload, Transport};
