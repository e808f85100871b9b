use std::cell::Cell;

use serde::Deserialize;

/// Options used when constructing a [`Registry`](crate::Registry)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emit diagnostics (declined bindings, failed conditions, pushes)
    pub debug: bool,
    /// Whether payloads actually reach providers' transports
    pub enabled: bool,
    /// The attribute declaring which event (and optional delegation selector) triggers a push
    pub event_attribute: String,
    /// The attribute holding an optional condition guarding the push
    pub condition_attribute: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            enabled: true,
            event_attribute: String::from("data-metric-event"),
            condition_attribute: String::from("data-metric-condition"),
        }
    }
}

/// The runtime switches of a [`Config`], shared with every handler a registry builds so that
/// toggling them affects handlers that are already bound.
#[derive(Debug)]
pub struct Settings {
    debug: Cell<bool>,
    enabled: Cell<bool>,
}

impl Settings {
    pub fn new(config: &Config) -> Self {
        Self {
            debug: Cell::new(config.debug),
            enabled: Cell::new(config.enabled),
        }
    }

    pub fn debug(&self) -> bool {
        self.debug.get()
    }

    pub fn enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_debug(&self, debug: bool) {
        self.debug.set(debug);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{ "debug": true }"#).unwrap();
        assert!(config.debug);
        assert!(config.enabled);
        assert_eq!(config.event_attribute, "data-metric-event");
        assert_eq!(config.condition_attribute, "data-metric-condition");
    }
}
