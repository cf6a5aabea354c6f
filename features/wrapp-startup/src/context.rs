use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
};

use crate::{errors::ContextError, types::TypeInfo};

/// The shared context handed to every initializer.
///
/// Values can be registered and retrieved based on type, one value per type.
/// Typical contents are application configs or handles to the host environment.
///
/// # Example
/// ```rust
/// use wrapp_startup::Context;
///
/// struct AppConfig {
///     app_name: String,
/// }
///
/// let mut context = Context::new();
/// context
///     .insert(AppConfig { app_name: "My Awesome App".to_string() })
///     .unwrap();
///
/// let config = context.get::<AppConfig>().unwrap();
/// assert_eq!(config.app_name, "My Awesome App");
/// ```
#[derive(Default)]
pub struct Context {
    values: HashMap<TypeId, (TypeInfo, Arc<dyn Any + Send + Sync + 'static>)>,
}
impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for (info, _) in self.values.values() {
            list.entry(&info.type_name);
        }
        list.finish()
    }
}

impl Context {
    /// Initializes an empty Context
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Retrieve the value with specified type, if registered.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|(_, value)| value.clone().downcast().ok())
    }

    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Add a value to the context.
    ///
    /// If the value type is already registered, it will return a [`ContextError`]
    pub fn insert<T: Send + Sync + 'static>(
        &mut self,
        value: T,
    ) -> Result<&mut Self, ContextError> {
        let info = TypeInfo::of::<T>();

        if self.values.contains_key(&info.type_id) {
            return Err(ContextError::AlreadyRegistered(info));
        }

        self.values.insert(info.type_id, (info, Arc::new(value)));
        Ok(self)
    }

    /// Can optionally add a value to the context.
    ///
    /// If the value provided is `Some(T)`, it will be the same as calling [`Context::insert`]
    /// If the value provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_insert<T: Send + Sync + 'static>(
        &mut self,
        value: Option<T>,
    ) -> Result<&mut Self, ContextError> {
        match value {
            Some(v) => self.insert(v),
            None => Ok(self),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
