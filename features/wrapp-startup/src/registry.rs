use std::{
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, TryLockError},
};

use crate::{
    builder::StartupBuilder,
    catalog::Catalog,
    context::Context,
    dependency_graph::DependencyGraph,
    discovery::{self, MetadataSource},
    errors::{RegistrationError, StartupError},
    initializer::Initializer,
    resolver::{downcast_instance, RegistryState, StartupHandle},
    trace::{TraceHook, TraceSection, DISCOVERY_SECTION},
    types::{Instance, TypeInfo},
};

/// The process wide registry, set at most once
static GLOBAL: OnceLock<StartupRegistry> = OnceLock::new();
/// Serializes creation of [GLOBAL], so the init function runs at most once
static GLOBAL_INIT: Mutex<()> = Mutex::new(());

/// Registry initializing components on demand, each at most once.
///
/// All initialization runs under one lock: two threads initializing at the same time are
/// fully serialized, even for unrelated keys. `create` is never called twice for a key and
/// never called concurrently.
///
/// The registry must not be called from inside [Initializer::create], which would deadlock.
/// Use the [StartupHandle] passed to `create` instead.
pub struct StartupRegistry {
    catalog: Catalog,
    context: Context,
    metadata: Option<Box<dyn MetadataSource>>,
    marker: String,
    trace: Option<Box<dyn TraceHook>>,
    state: Mutex<RegistryState>,
}

impl StartupRegistry {
    pub(crate) fn new(
        catalog: Catalog,
        context: Context,
        metadata: Option<Box<dyn MetadataSource>>,
        marker: String,
        trace: Option<Box<dyn TraceHook>>,
    ) -> Self {
        StartupRegistry {
            catalog,
            context,
            metadata,
            marker,
            trace,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Returns the process wide registry, creating it on first access.
    ///
    /// `init` is only called if no registry exists yet, and at most once per process even
    /// under concurrent callers. If building fails the registry stays unset, so a later
    /// call may try again.
    pub fn get_instance(
        init: impl FnOnce() -> StartupBuilder,
    ) -> Result<&'static StartupRegistry, RegistrationError> {
        if let Some(registry) = GLOBAL.get() {
            return Ok(registry);
        }

        let _guard = GLOBAL_INIT.lock().unwrap_or_else(PoisonError::into_inner);

        // Double check - another thread might have created it while we waited for the lock
        if let Some(registry) = GLOBAL.get() {
            return Ok(registry);
        }

        let registry = init().build()?;
        tracing::debug!("Created global startup registry");
        Ok(GLOBAL.get_or_init(|| registry))
    }

    /// Returns the process wide registry, if it was created already
    pub fn global() -> Option<&'static StartupRegistry> {
        GLOBAL.get()
    }

    /// Returns the instance of `I`, initializing it and all of its dependencies first if required
    pub fn initialize<I: Initializer>(&self) -> Result<Arc<I::Output>, StartupError> {
        let key = <I as Initializer>::key();
        let instance = self.initialize_key(key)?;
        downcast_instance(key, &instance)
    }

    /// Untyped version of [StartupRegistry::initialize]
    pub fn initialize_key(&self, key: TypeInfo) -> Result<Instance, StartupError> {
        self.with_handle(|handle| handle.resolve(key))
    }

    /// Returns true if `I` was listed in the metadata, whether it is initialized or not
    pub fn was_discovered<I: Initializer>(&self) -> bool {
        self.was_discovered_key(<I as Initializer>::key())
    }

    pub fn was_discovered_key(&self, key: TypeInfo) -> bool {
        self.lock_state().discovered.contains(&key.type_id)
    }

    /// Returns true if `I` has been initialized successfully
    pub fn is_initialized<I: Initializer>(&self) -> bool {
        self.is_initialized_key(<I as Initializer>::key())
    }

    pub fn is_initialized_key(&self, key: TypeInfo) -> bool {
        self.lock_state().initialized.contains_key(&key.type_id)
    }

    /// Discovers and initializes all initializers listed in the configured metadata source
    ///
    /// Without a configured source nothing is discovered.
    /// Returns the number of discovered initializers.
    pub fn discover_and_initialize(&self) -> Result<usize, StartupError> {
        match &self.metadata {
            Some(source) => self.discover_and_initialize_from(source.as_ref()),
            None => {
                tracing::debug!("No startup metadata configured - nothing to discover");
                Ok(0)
            }
        }
    }

    /// Discovers and initializes all initializers listed in `source`
    pub fn discover_and_initialize_from(
        &self,
        source: &dyn MetadataSource,
    ) -> Result<usize, StartupError> {
        self.with_handle(|handle| {
            // Opened under the lock, so sections of concurrent passes do not interleave
            let _section = TraceSection::begin(self.trace.as_deref(), DISCOVERY_SECTION);
            discovery::discover(source, &self.catalog, &self.marker, handle)
        })
    }

    /// The context shared with all initializers
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Builds the graph of all registered initializers, e.g. to [DependencyGraph::check] it
    pub fn dependency_graph(&self) -> Result<DependencyGraph, StartupError> {
        DependencyGraph::new(&self.catalog)
    }

    /// Runs `resolve` under the registry lock with a fresh in-progress chain
    fn with_handle<R>(
        &self,
        resolve: impl FnOnce(&mut StartupHandle<'_>) -> Result<R, StartupError>,
    ) -> Result<R, StartupError> {
        let mut state = self.lock_state();
        let mut in_progress = Vec::new();
        let mut handle = StartupHandle::new(
            &self.catalog,
            &self.context,
            self.trace.as_deref(),
            &mut *state,
            &mut in_progress,
        );
        resolve(&mut handle)
    }

    /// The state only ever holds fully created instances, so it stays valid after a panic in `create`
    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for StartupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("StartupRegistry");
        let state = match self.state.try_lock() {
            Ok(state) => Some(state),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        };
        for info in self.catalog.keys() {
            let val = match &state {
                Some(state) if state.initialized.contains_key(&info.type_id) => "initialized",
                Some(_) => "pending",
                None => "locked",
            };
            map.field(info.type_name, &val);
        }
        map.finish()
    }
}
