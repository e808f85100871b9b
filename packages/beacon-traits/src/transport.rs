//! The analytics side of Beacon: whatever object a provider hands its payloads to.

/// Data handed to a [`Transport`]. By convention adapters push an ordered argument list
/// (a JSON array), but the shape is up to each provider.
pub type Payload = serde_json::Value;

/// A resolved analytics object. Beacon only ever calls `push`.
pub trait Transport {
    fn push(&self, payload: Payload);
}
