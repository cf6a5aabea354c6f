use std::{
    any::TypeId,
    collections::{BTreeMap, HashSet},
};

use thiserror::Error;

use crate::{
    catalog::Catalog,
    errors::{KeyChain, StartupError},
    types::TypeInfo,
};

/// Graph of all registered initializers
///
/// Used to report missing dependencies and cycles up front, and to visualize the startup.
/// Initialization itself does not depend on it: cycles are still detected while resolving.
pub struct DependencyGraph {
    map: BTreeMap<TypeId, DependencyGraphEntry>,
}
impl DependencyGraph {
    /// Builds the graph, obtaining a fresh initializer for every registered key
    pub(crate) fn new(catalog: &Catalog) -> Result<Self, StartupError> {
        let mut graph = Self {
            map: Default::default(),
        };

        for info in catalog.keys() {
            let dependencies = catalog.instantiate(info)?.dependencies();
            graph
                .map
                .insert(info.type_id, DependencyGraphEntry { info, dependencies });
        }

        Ok(graph)
    }

    /// Returns the declared dependencies of a registered initializer
    pub fn dependencies_of(&self, key: TypeInfo) -> Option<&[TypeInfo]> {
        self.map
            .get(&key.type_id)
            .map(|entry| entry.dependencies.as_slice())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Validate the graph
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();
        for entry in self.map.values() {
            let mut dependency_chain = Vec::new();
            check_recurse(
                self,
                &mut checked,
                &mut errors,
                &mut dependency_chain,
                entry,
            );
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        return Ok(());

        fn check_recurse(
            graph: &DependencyGraph,
            checked: &mut HashSet<TypeId>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<TypeInfo>,
            entry: &DependencyGraphEntry,
        ) {
            // Circular Dependency Check
            if let Some(start) = dependency_chain.iter().position(|info| *info == entry.info) {
                let mut chain = dependency_chain[start..].to_vec();
                chain.push(entry.info); // Add current so chain is complete

                errors.push(DependencyGraphError::CircularDependency {
                    from: chain[0],
                    chain: KeyChain(chain),
                });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(entry.info.type_id) {
                return;
            };

            dependency_chain.push(entry.info);

            for dependency in &entry.dependencies {
                let Some(next_entry) = graph.map.get(&dependency.type_id) else {
                    errors.push(DependencyGraphError::MissingDependency {
                        dependency: *dependency,
                        required_by: entry.info,
                    });
                    continue;
                };

                check_recurse(graph, checked, errors, dependency_chain, next_entry);
            }

            dependency_chain.pop();
        }
    }
}
impl std::fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in self.map.values() {
            let dependencies: Vec<&str> = entry
                .dependencies
                .iter()
                .map(TypeInfo::short_name)
                .collect();
            writeln!(
                f,
                "{} -> [{}]",
                entry.info.short_name(),
                dependencies.join(", ")
            )?;
        }
        Ok(())
    }
}

struct DependencyGraphEntry {
    info: TypeInfo,
    dependencies: Vec<TypeInfo>,
}

#[derive(Error, Debug, Clone)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is not registered")]
    MissingDependency {
        dependency: TypeInfo,
        required_by: TypeInfo,
    },
    #[error("A Circular Dependency exists starting at '{from}': {chain}")]
    CircularDependency { from: TypeInfo, chain: KeyChain },
}
impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}
