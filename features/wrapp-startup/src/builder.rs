use std::convert::Infallible;

use crate::{
    catalog::{Catalog, Registration},
    context::Context,
    discovery::{MetadataSource, DEFAULT_MARKER},
    errors::RegistrationError,
    initializer::Initializer,
    registry::StartupRegistry,
    trace::TraceHook,
    types::{DynError, TypeInfo},
};

/// Collects everything a [StartupRegistry] needs.
///
/// 1. Register every initializer which may be resolved, with the factory producing it
/// 2. Optionally register aliases, the shared context, the metadata source and hooks
/// 3. Build the registry, either standalone or as the process wide one
pub struct StartupBuilder {
    registrations: Vec<Registration>,
    aliases: Vec<(String, TypeInfo)>,
    context: Context,
    metadata: Option<Box<dyn MetadataSource>>,
    marker: String,
    trace: Option<Box<dyn TraceHook>>,
}
impl Default for StartupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StartupBuilder {
    pub fn new() -> Self {
        StartupBuilder {
            registrations: Vec::new(),
            aliases: Vec::new(),
            context: Context::new(),
            metadata: None,
            marker: DEFAULT_MARKER.to_string(),
            trace: None,
        }
    }
}
impl StartupBuilder {
    /// Registers an initializer which is constructed through [Default]
    pub fn register<I: Initializer + Default>(self) -> Self {
        self.register_with(|| Ok::<_, Infallible>(I::default()))
    }

    /// Registers an initializer with a custom factory
    ///
    /// The factory is called every time the initializer is needed, it must not rely on
    /// being called only once.
    pub fn register_with<I, E, F>(mut self, factory: F) -> Self
    where
        I: Initializer,
        E: Into<DynError>,
        F: Fn() -> Result<I, E> + Send + Sync + 'static,
    {
        self.registrations.push(Registration::new(factory));
        self
    }

    /// Adds a name under which metadata entries may refer to `I`
    pub fn alias<I: Initializer>(mut self, name: impl Into<String>) -> Self {
        self.aliases.push((name.into(), <I as Initializer>::key()));
        self
    }

    /// Sets the context shared with all initializers
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Sets the source read by [StartupRegistry::discover_and_initialize]
    pub fn metadata(mut self, source: impl MetadataSource + 'static) -> Self {
        self.metadata = Some(Box::new(source));
        self
    }

    /// Sets the value marking metadata entries as initializers
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn trace_hook(mut self, hook: impl TraceHook + 'static) -> Self {
        self.trace = Some(Box::new(hook));
        self
    }

    /// Builds a standalone registry
    pub fn build(self) -> Result<StartupRegistry, RegistrationError> {
        let StartupBuilder {
            registrations,
            aliases,
            context,
            metadata,
            marker,
            trace,
        } = self;

        tracing::debug!(
            "Building startup registry with {} initializers and {} aliases",
            registrations.len(),
            aliases.len()
        );

        let catalog = Catalog::new(registrations, aliases)?;
        Ok(StartupRegistry::new(catalog, context, metadata, marker, trace))
    }
}
