use std::{
    any::{type_name, TypeId},
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    catalog::Catalog,
    context::Context,
    errors::{ConstructionError, KeyChain, StartupError},
    initializer::Initializer,
    trace::{TraceHook, TraceSection},
    types::{Injectable, Instance, TypeInfo},
};

/// State guarded by the registry lock
#[derive(Default)]
pub(crate) struct RegistryState {
    /// Produced instances - an entry exists only once `create` returned successfully
    pub initialized: HashMap<TypeId, Instance>,
    /// Keys registered through discovery
    pub discovered: HashSet<TypeId>,
}

/// Handle for resolving initializers during one top-level initialization.
///
/// The handle is passed to [Initializer::create]. Initializers resolved through it share
/// the in-progress chain of the call that is currently running, so cycles are detected
/// no matter whether they are reached through declared dependencies or through the handle.
pub struct StartupHandle<'a> {
    catalog: &'a Catalog,
    context: &'a Context,
    trace: Option<&'a dyn TraceHook>,
    state: &'a mut RegistryState,
    /// Keys currently being resolved, in call order
    in_progress: &'a mut Vec<TypeInfo>,
}

impl<'a> StartupHandle<'a> {
    pub(crate) fn new(
        catalog: &'a Catalog,
        context: &'a Context,
        trace: Option<&'a dyn TraceHook>,
        state: &'a mut RegistryState,
        in_progress: &'a mut Vec<TypeInfo>,
    ) -> Self {
        StartupHandle {
            catalog,
            context,
            trace,
            state,
            in_progress,
        }
    }

    /// The shared context of the registry
    pub fn context(&self) -> &Context {
        self.context
    }

    /// Returns the instance of `I`, initializing it and its dependencies first if required
    pub fn initialize<I: Initializer>(&mut self) -> Result<Arc<I::Output>, StartupError> {
        let key = <I as Initializer>::key();
        let instance = self.resolve(key)?;
        downcast_instance(key, &instance)
    }

    /// Untyped version of [StartupHandle::initialize]
    pub fn initialize_key(&mut self, key: TypeInfo) -> Result<Instance, StartupError> {
        self.resolve(key)
    }

    /// Returns the instance of `I` if it is already initialized
    pub fn get<I: Initializer>(&self) -> Option<Arc<I::Output>> {
        self.state
            .initialized
            .get(&TypeId::of::<I>())
            .and_then(|instance| instance.downcast().ok())
    }

    pub(crate) fn mark_discovered(&mut self, key: TypeInfo) {
        self.state.discovered.insert(key.type_id);
    }

    pub(crate) fn resolve(&mut self, key: TypeInfo) -> Result<Instance, StartupError> {
        // Brackets cache hits and cycles as well, closed on every return path
        let _section = TraceSection::begin(self.trace, key.short_name());

        // Re-entering a key which is still in progress closes a cycle
        if self
            .in_progress
            .iter()
            .any(|entry| entry.type_id == key.type_id)
        {
            let mut chain = self.in_progress.clone();
            chain.push(key); // Add current so chain is complete
            let chain = KeyChain(chain);

            tracing::error!("Cycle detected while initializing '{}': {}", key, chain);
            return Err(StartupError::CycleDetected { key, chain });
        }

        if let Some(instance) = self.state.initialized.get(&key.type_id) {
            tracing::trace!("'{}' is already initialized", key);
            return Ok(instance.clone());
        }

        let _span = tracing::debug_span!("initialize", initializer = key.short_name()).entered();

        self.in_progress.push(key);
        let result = self.construct(key);
        self.in_progress.pop();

        let instance = result?;
        self.state.initialized.insert(key.type_id, instance.clone());
        Ok(instance)
    }

    /// Runs the initializer for `key` after resolving its dependencies
    fn construct(&mut self, key: TypeInfo) -> Result<Instance, StartupError> {
        tracing::debug!("Initializing {}", key);
        let initializer = self.catalog.instantiate(key)?;

        // Depth first, in declared order
        for dependency in initializer.dependencies() {
            if !self.state.initialized.contains_key(&dependency.type_id) {
                self.resolve(dependency)?;
            }
        }

        let instance = initializer.create(self).map_err(|error| {
            // Errors from nested resolution are passed through as they are
            match error.downcast::<StartupError>() {
                Ok(startup_error) => *startup_error,
                Err(error) => StartupError::construction(
                    key.type_name,
                    ConstructionError::Create(Arc::new(error)),
                ),
            }
        });

        match &instance {
            Ok(_) => tracing::debug!("Initialized {}", key),
            Err(e) => tracing::warn!("Initializing {} failed: {}", key, e),
        }
        instance
    }
}

pub(crate) fn downcast_instance<T: Injectable>(
    key: TypeInfo,
    instance: &Instance,
) -> Result<Arc<T>, StartupError> {
    instance.downcast().map_err(|actual| {
        StartupError::construction(
            key.type_name,
            ConstructionError::DowncastFailed {
                required: type_name::<T>(),
                actual,
            },
        )
    })
}
