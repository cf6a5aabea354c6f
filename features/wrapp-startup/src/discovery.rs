use std::sync::Arc;

use crate::{
    catalog::Catalog,
    errors::{ConstructionError, StartupError, METADATA_SOURCE_NAME},
    resolver::StartupHandle,
    types::DynError,
};

/// Default value marking a metadata entry as an initializer to discover
pub const DEFAULT_MARKER: &str = "wrapp.startup";

/// A source of (name, value) metadata entries
///
/// Entries whose value equals the registry's marker name an initializer, by its fully
/// qualified type name or by an alias registered on the builder.
pub trait MetadataSource: Send + Sync {
    /// Reads all entries, in the order they should be discovered
    fn entries(&self) -> Result<Vec<(String, String)>, DynError>;
}

/// An in-memory metadata table, keeping insertion order
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    entries: Vec<(String, String)>,
}
impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }
}
impl<Name: Into<String>, Value: Into<String>> FromIterator<(Name, Value)> for StaticMetadata {
    fn from_iter<T: IntoIterator<Item = (Name, Value)>>(iter: T) -> Self {
        StaticMetadata {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}
impl MetadataSource for StaticMetadata {
    fn entries(&self) -> Result<Vec<(String, String)>, DynError> {
        Ok(self.entries.clone())
    }
}

impl MetadataSource for Vec<(String, String)> {
    fn entries(&self) -> Result<Vec<(String, String)>, DynError> {
        Ok(self.clone())
    }
}

/// Any function returning the entries can be used as a source, e.g. to read them lazily
impl<F> MetadataSource for F
where
    F: Fn() -> Result<Vec<(String, String)>, DynError> + Send + Sync,
{
    fn entries(&self) -> Result<Vec<(String, String)>, DynError> {
        self()
    }
}

/// Runs one discovery pass.
///
/// Every marked entry is recorded as discovered and initialized through the same handle,
/// so cycles spanning several discovered initializers are caught.
/// The first failure aborts the pass, anything discovered before it stays.
pub(crate) fn discover(
    source: &dyn MetadataSource,
    catalog: &Catalog,
    marker: &str,
    handle: &mut StartupHandle<'_>,
) -> Result<usize, StartupError> {
    let entries = source.entries().map_err(|error| {
        tracing::error!("Failed to read startup metadata: {}", error);
        StartupError::construction(
            METADATA_SOURCE_NAME,
            ConstructionError::Metadata(Arc::new(error)),
        )
    })?;

    tracing::debug!("Discovering initializers in {} metadata entries", entries.len());

    let mut discovered = 0;
    for (name, value) in entries {
        if value != marker {
            continue;
        }

        let Some(key) = catalog.lookup(&name) else {
            tracing::error!("Metadata names unknown initializer '{}'", name);
            return Err(StartupError::construction(name, ConstructionError::UnknownType));
        };

        tracing::debug!("Discovered {}", key);
        handle.mark_discovered(key);
        handle.resolve(key)?;
        discovered += 1;
    }

    tracing::debug!("Discovery completed - {} initializers discovered", discovered);
    Ok(discovered)
}
