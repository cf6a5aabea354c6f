use std::{any::TypeId, collections::HashMap};

use crate::{
    errors::{ConstructionError, RegistrationError, StartupError},
    initializer::{DynInitializer, Initializer},
    types::{DynError, TypeInfo},
};

type MakeInitializer = Box<dyn Fn() -> Result<Box<dyn DynInitializer>, DynError> + Send + Sync>;

/// A registered way to obtain an initializer
pub(crate) struct Registration {
    pub info: TypeInfo,
    make: MakeInitializer,
}
impl Registration {
    pub fn new<I, E, F>(factory: F) -> Self
    where
        I: Initializer,
        E: Into<DynError>,
        F: Fn() -> Result<I, E> + Send + Sync + 'static,
    {
        Registration {
            info: <I as Initializer>::key(),
            make: Box::new(move || {
                factory()
                    .map(|initializer| Box::new(initializer) as Box<dyn DynInitializer>)
                    .map_err(Into::into)
            }),
        }
    }
}

/// Lookup from keys and names to initializer factories
///
/// The catalog is fixed once the registry is built.
#[derive(Default)]
pub(crate) struct Catalog {
    entries: HashMap<TypeId, Registration>,
    names: HashMap<String, TypeInfo>,
}
impl Catalog {
    pub fn new(
        registrations: Vec<Registration>,
        aliases: Vec<(String, TypeInfo)>,
    ) -> Result<Self, RegistrationError> {
        let mut catalog = Catalog::default();

        for registration in registrations {
            let info = registration.info;
            if catalog.entries.insert(info.type_id, registration).is_some() {
                return Err(RegistrationError::DuplicateKey(info));
            }
            catalog.add_name(info.type_name.to_string(), info)?;
        }

        for (name, info) in aliases {
            if !catalog.entries.contains_key(&info.type_id) {
                tracing::warn!("Alias '{name}' points at unregistered initializer '{info}'");
            }
            catalog.add_name(name, info)?;
        }

        Ok(catalog)
    }

    fn add_name(&mut self, name: String, info: TypeInfo) -> Result<(), RegistrationError> {
        match self.names.get(&name) {
            Some(existing) => Err(RegistrationError::DuplicateName {
                name,
                existing: *existing,
            }),
            None => {
                self.names.insert(name, info);
                Ok(())
            }
        }
    }

    /// Obtains a fresh initializer for the given key
    pub fn instantiate(&self, key: TypeInfo) -> Result<Box<dyn DynInitializer>, StartupError> {
        let Some(registration) = self.entries.get(&key.type_id) else {
            return Err(StartupError::construction(
                key.type_name,
                ConstructionError::NotRegistered,
            ));
        };

        (registration.make)().map_err(|error| {
            StartupError::construction(
                key.type_name,
                ConstructionError::Instantiation(error.into()),
            )
        })
    }

    /// Resolves a fully qualified type name or alias to its key
    pub fn lookup(&self, name: &str) -> Option<TypeInfo> {
        self.names.get(name).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.entries.values().map(|registration| registration.info)
    }
}
