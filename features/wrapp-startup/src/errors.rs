use std::sync::Arc;

use thiserror::Error;

use crate::types::{DynError, TypeInfo};

/// Name used in [StartupError::ConstructionFailed] when the metadata itself could not be read
pub const METADATA_SOURCE_NAME: &str = "<metadata>";

/// Errors while initializing components
#[derive(Error, Debug, Clone)]
pub enum StartupError {
    /// An initializer transitively depends on itself
    #[error("Cannot initialize '{key}' - a cycle was detected: {chain}")]
    CycleDetected { key: TypeInfo, chain: KeyChain },

    /// Instantiating the initializer or running its `create` failed
    #[error("Failed to initialize '{name}' - {cause}")]
    ConstructionFailed {
        name: String,
        cause: ConstructionError,
    },
}
impl StartupError {
    pub(crate) fn construction(name: impl Into<String>, cause: ConstructionError) -> Self {
        Self::ConstructionFailed {
            name: name.into(),
            cause,
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, StartupError::CycleDetected { .. })
    }
}

/// The original cause of a [StartupError::ConstructionFailed]
#[derive(Error, Debug, Clone)]
pub enum ConstructionError {
    /// No factory is registered for the requested key
    #[error("no initializer is registered for this key")]
    NotRegistered,
    /// A metadata entry names a type the catalog does not know
    #[error("the name does not resolve to a registered initializer")]
    UnknownType,
    /// The factory could not produce the initializer
    #[error("instantiating the initializer failed: {0}")]
    Instantiation(Arc<DynError>),
    /// The initializer's `create` failed
    #[error("create failed: {0}")]
    Create(Arc<DynError>),
    /// The metadata source could not be read
    #[error("reading the metadata failed: {0}")]
    Metadata(Arc<DynError>),
    #[error("failed to downcast, required: '{required}' actual: '{actual}'")]
    DowncastFailed {
        required: &'static str,
        actual: &'static str,
    },
}

/// Errors when registering initializers on the [crate::StartupBuilder]
#[derive(Error, Debug, Clone)]
pub enum RegistrationError {
    #[error("An initializer has been registered twice: '{0}'")]
    DuplicateKey(TypeInfo),
    #[error("The name '{name}' is already used by '{existing}'")]
    DuplicateName { name: String, existing: TypeInfo },
}

/// Errors when registering values on the [crate::Context]
#[derive(Error, Debug, Clone)]
pub enum ContextError {
    /// The value type is already registered
    #[error("A context value of type '{0}' is already registered")]
    AlreadyRegistered(TypeInfo),
}

/// The chain of keys that were in progress when a cycle was found
///
/// The last entry is the key that was entered a second time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChain(pub Vec<TypeInfo>);
impl std::fmt::Display for KeyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(TypeInfo::short_name).collect();
        f.write_str(&names.join(" -> "))
    }
}
