//! Wrapp Startup initializes components lazily, in dependency order, each at most once.
//!
//! Wrapp Startup consists of the following parts:
//!
//! 1. [Initializer] - a unit of initialization logic declaring the initializers it depends on
//! 2. [StartupBuilder] - registers initializers, the shared [Context], metadata and hooks
//! 3. [StartupRegistry] - resolves initializers on demand, caches their instances and
//!    detects dependency cycles
//! 4. [MetadataSource] - an external list of initializers to initialize eagerly at startup
//!
//! # Examples
//!
//! ```rust
//! use std::convert::Infallible;
//! use wrapp_startup::{Initializer, StartupBuilder, StartupHandle, StaticMetadata};
//!
//! pub struct Telemetry;
//!
//! #[derive(Default)]
//! pub struct TelemetryInit;
//! impl Initializer for TelemetryInit {
//!     type Output = Telemetry;
//!
//!     fn create(&self, _: &mut StartupHandle<'_>) -> Result<Telemetry, Infallible> {
//!         Ok(Telemetry)
//!     }
//! }
//!
//! let registry = StartupBuilder::new()
//!     .register::<TelemetryInit>()
//!     .alias::<TelemetryInit>("app.TelemetryInit")
//!     .metadata(StaticMetadata::new().entry("app.TelemetryInit", "wrapp.startup"))
//!     .build()
//!     .unwrap();
//!
//! registry.discover_and_initialize().unwrap();
//! assert!(registry.was_discovered::<TelemetryInit>());
//! assert!(registry.is_initialized::<TelemetryInit>());
//! ```

pub mod builder;
pub(crate) mod catalog;
pub mod context;
pub mod dependency_graph;
pub mod discovery;
pub mod errors;
pub mod initializer;
pub mod registry;
pub mod resolver;
pub mod trace;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::StartupBuilder;
pub use context::Context;
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DependencyGraphErrors};
pub use discovery::{MetadataSource, StaticMetadata, DEFAULT_MARKER};
pub use errors::{ConstructionError, ContextError, KeyChain, RegistrationError, StartupError};
pub use initializer::Initializer;
pub use registry::StartupRegistry;
pub use resolver::StartupHandle;
pub use trace::TraceHook;
pub use types::{DynError, Injectable, Instance, TypeInfo};
