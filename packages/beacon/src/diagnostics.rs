use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::Settings;

/// Scoped diagnostic logging, silent unless the shared `debug` switch is on.
///
/// Every message carries the scope (a provider's short name, or `registry`) as the `provider`
/// field.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    settings: Rc<Settings>,
    scope: SmolStr,
}

impl Diagnostics {
    pub fn new(settings: Rc<Settings>, scope: impl Into<SmolStr>) -> Self {
        Self {
            settings,
            scope: scope.into(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.settings.debug()
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        if self.enabled() {
            #[cfg(feature = "tracing")]
            tracing::info!(provider = %self.scope, "{args}");
        }
        let _ = args;
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        if self.enabled() {
            #[cfg(feature = "tracing")]
            tracing::warn!(provider = %self.scope, "{args}");
        }
        let _ = args;
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        if self.enabled() {
            #[cfg(feature = "tracing")]
            tracing::error!(provider = %self.scope, "{args}");
        }
        let _ = args;
    }
}
