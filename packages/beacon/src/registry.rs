use std::rc::Rc;

use beacon_traits::{Dom, NodeId, Payload};
use indexmap::IndexMap;

use crate::binder::ProviderEntry;
use crate::{Binder, Binding, Config, Diagnostics, Provider, PushContext, Settings};

/// The set of registered providers and the bindings attached for them.
///
/// A registry does not own the DOM it binds: every operation that attaches or detaches
/// listeners borrows it. Listeners stay attached until the provider is removed, so call
/// [`Registry::teardown`] (or [`Registry::clear`]) before dropping a registry whose document
/// lives on.
pub struct Registry {
    providers: IndexMap<String, ProviderEntry>,
    config: Config,
    settings: Rc<Settings>,
    log: Diagnostics,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Registry {
    pub fn new(config: Config) -> Self {
        let settings = Rc::new(Settings::new(&config));
        let log = Diagnostics::new(settings.clone(), "registry");
        Self {
            providers: IndexMap::new(),
            config,
            settings,
            log,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Allow or suppress pushes, including from handlers that are already bound.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        self.settings.set_enabled(enabled);
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
        self.settings.set_debug(debug);
    }

    /// A binder over this registry's providers and `dom`
    pub fn binder<'a>(&'a mut self, dom: &'a mut dyn Dom) -> Binder<'a> {
        Binder::new(&mut self.providers, &self.config, &self.log, dom)
    }

    /// Register `provider` and bind it to the whole document. Returns the number of bindings
    /// attached.
    ///
    /// A provider with the same short name is unbound and replaced, and the replacement counts
    /// as the newest registration. Providers that were already registered are not bound again.
    pub fn add_provider(&mut self, dom: &mut dyn Dom, provider: Rc<dyn Provider>) -> usize {
        let short_name = provider.short_name().to_string();
        self.log.info(format_args!(
            "Adding provider {} ({short_name})",
            provider.name()
        ));

        if self.providers.contains_key(&short_name) {
            self.log.warn(format_args!(
                "Provider {short_name} is already registered and will be replaced"
            ));
            self.binder(dom).unbind(Some(&short_name));
            self.providers.shift_remove(&short_name);
        }

        let context = PushContext::new(provider, self.settings.clone());
        self.providers
            .insert(short_name.clone(), ProviderEntry::new(context));
        self.binder(dom).parse_for(&short_name, None)
    }

    /// Unbind and deregister the provider named `short_name`. Returns whether it was registered.
    pub fn remove_provider(&mut self, dom: &mut dyn Dom, short_name: &str) -> bool {
        if !self.providers.contains_key(short_name) {
            self.log
                .warn(format_args!("Provider {short_name} is not registered"));
            return false;
        }
        self.binder(dom).unbind(Some(short_name));
        self.providers.shift_remove(short_name);
        self.log
            .info(format_args!("Removed provider {short_name}"));
        true
    }

    /// Unbind and deregister every provider.
    pub fn clear(&mut self, dom: &mut dyn Dom) {
        self.binder(dom).unbind(None);
        self.providers.clear();
    }

    /// Clear the registry and drop it.
    pub fn teardown(mut self, dom: &mut dyn Dom) {
        self.clear(dom);
    }

    /// Bind every registered provider to the declared events below `root` (the whole document
    /// when `None`). Markup that was already parsed is bound again.
    pub fn parse(&mut self, dom: &mut dyn Dom, root: Option<NodeId>) -> usize {
        self.binder(dom).parse(root)
    }

    /// Push `payload` through the named provider's pipeline.
    pub fn push(&self, short_name: &str, payload: Payload) {
        match self.providers.get(short_name) {
            Some(entry) => entry.context.push(payload),
            None => self.log.error(format_args!(
                "Provider {short_name} is not registered, cannot push {payload}"
            )),
        }
    }

    /// Short names of the registered providers, in registration order
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn provider(&self, short_name: &str) -> Option<&Rc<dyn Provider>> {
        self.providers
            .get(short_name)
            .map(|entry| entry.context.provider())
    }

    pub fn bindings(&self, short_name: &str) -> &[Binding] {
        self.providers
            .get(short_name)
            .map(|entry| entry.bindings.as_slice())
            .unwrap_or_default()
    }

    pub fn binding_count(&self, short_name: &str) -> usize {
        self.bindings(short_name).len()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
