//! Initializers for tests
//!
//! Every `Node<ID>` is a distinct initializer type, so graphs of any shape can be declared
//! without writing a type per node.

use std::sync::{Arc, Mutex};

use crate::{
    builder::StartupBuilder, initializer::Initializer, resolver::StartupHandle, types::TypeInfo,
};

/// Output of `Node<ID>`
#[derive(Debug, PartialEq, Eq)]
pub struct Built(pub usize);

/// Records which nodes were created, in order
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<usize>>>);
impl Recorder {
    pub fn created(&self) -> Vec<usize> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, id: usize) -> usize {
        self.created().into_iter().filter(|created| *created == id).count()
    }
}

pub struct Node<const ID: usize> {
    dependencies: Vec<TypeInfo>,
    recorder: Recorder,
    fail: bool,
}
impl<const ID: usize> Initializer for Node<ID> {
    type Output = Built;

    fn dependencies(&self) -> Vec<TypeInfo> {
        self.dependencies.clone()
    }

    fn create(&self, _: &mut StartupHandle<'_>) -> Result<Built, String> {
        if self.fail {
            return Err(format!("node {ID} failed"));
        }
        self.recorder.0.lock().unwrap().push(ID);
        Ok(Built(ID))
    }
}

pub fn key<const ID: usize>() -> TypeInfo {
    TypeInfo::of::<Node<ID>>()
}

/// Registers `Node<ID>` depending on `dependencies`
pub fn node<const ID: usize>(
    builder: StartupBuilder,
    recorder: &Recorder,
    dependencies: Vec<TypeInfo>,
) -> StartupBuilder {
    register::<ID>(builder, recorder, dependencies, false)
}

/// Registers `Node<ID>` whose `create` always fails
pub fn failing_node<const ID: usize>(
    builder: StartupBuilder,
    recorder: &Recorder,
    dependencies: Vec<TypeInfo>,
) -> StartupBuilder {
    register::<ID>(builder, recorder, dependencies, true)
}

fn register<const ID: usize>(
    builder: StartupBuilder,
    recorder: &Recorder,
    dependencies: Vec<TypeInfo>,
    fail: bool,
) -> StartupBuilder {
    let recorder = recorder.clone();
    builder.register_with(move || {
        Ok::<_, String>(Node::<ID> {
            dependencies: dependencies.clone(),
            recorder: recorder.clone(),
            fail,
        })
    })
}
