use crate::{
    resolver::StartupHandle,
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// A unit of initialization logic, producing one shared instance of its output
///
/// Initializers are stateless descriptions: the registry obtains a fresh one from
/// its factory every time it needs to resolve the key, and drops it afterwards.
///
/// # Example
/// ```rust
/// use std::{convert::Infallible, sync::Arc};
/// use wrapp_startup::{Initializer, StartupBuilder, StartupHandle, TypeInfo};
///
/// struct Database { url: String }
/// struct Repository { db: Arc<Database> }
///
/// #[derive(Default)]
/// struct DatabaseInit;
/// impl Initializer for DatabaseInit {
///     type Output = Database;
///
///     fn create(&self, _: &mut StartupHandle<'_>) -> Result<Database, Infallible> {
///         Ok(Database { url: "postgres://localhost".into() })
///     }
/// }
///
/// #[derive(Default)]
/// struct RepositoryInit;
/// impl Initializer for RepositoryInit {
///     type Output = Repository;
///
///     fn dependencies(&self) -> Vec<TypeInfo> {
///         vec![DatabaseInit::key()]
///     }
///
///     fn create(&self, handle: &mut StartupHandle<'_>) -> Result<Repository, wrapp_startup::StartupError> {
///         Ok(Repository { db: handle.initialize::<DatabaseInit>()? })
///     }
/// }
///
/// let registry = StartupBuilder::new()
///     .register::<DatabaseInit>()
///     .register::<RepositoryInit>()
///     .build()
///     .unwrap();
///
/// let repository = registry.initialize::<RepositoryInit>().unwrap();
/// assert_eq!(repository.db.url, "postgres://localhost");
/// ```
pub trait Initializer: Send + Sync + 'static {
    type Output: Injectable;

    /// Returns the key identifying this initializer
    fn key() -> TypeInfo
    where
        Self: Sized,
    {
        TypeInfo::of::<Self>()
    }

    /// Returns the keys of the initializers which must be initialized before this one
    ///
    /// Dependencies are resolved in the returned order.
    fn dependencies(&self) -> Vec<TypeInfo> {
        Vec::new()
    }

    /// Produces the instance
    ///
    /// All declared dependencies are already initialized when this is called and can be
    /// retrieved through the handle.
    fn create(
        &self,
        handle: &mut StartupHandle<'_>,
    ) -> Result<Self::Output, impl Into<DynError>>;
}

/// Wrapper Trait for initializers, producing instances of Any
pub(crate) trait DynInitializer: Send + Sync {
    fn dependencies(&self) -> Vec<TypeInfo>;

    fn create(&self, handle: &mut StartupHandle<'_>) -> Result<Instance, DynError>;
}
// Impl DynInitializer for any Initializer
impl<Specific: Initializer> DynInitializer for Specific {
    fn dependencies(&self) -> Vec<TypeInfo> {
        Initializer::dependencies(self)
    }

    fn create(&self, handle: &mut StartupHandle<'_>) -> Result<Instance, DynError> {
        // Forward the call to the specific implementation
        Initializer::create(self, handle)
            .map(Instance::new)
            .map_err(|e| e.into())
    }
}
