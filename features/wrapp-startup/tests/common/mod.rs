#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread::{self, ThreadId},
    time::Duration,
};

use wrapp_startup::{Initializer, StartupBuilder, StartupHandle, TraceHook, TypeInfo};

/// Shows test logs with `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Tracks how often and how concurrently `create` runs
#[derive(Default)]
pub struct Probe {
    active: AtomicUsize,
    max_active: AtomicUsize,
    creates: Mutex<HashMap<usize, usize>>,
}
impl Probe {
    pub fn creates(&self, id: usize) -> usize {
        self.creates.lock().unwrap().get(&id).copied().unwrap_or(0)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn enter(&self, id: usize) {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        *self.creates.lock().unwrap().entry(id).or_default() += 1;
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct Service(pub usize);

/// An initializer taking a while to create its [Service]
pub struct Slow<const ID: usize> {
    dependencies: Vec<TypeInfo>,
    probe: Arc<Probe>,
}
impl<const ID: usize> Initializer for Slow<ID> {
    type Output = Service;

    fn dependencies(&self) -> Vec<TypeInfo> {
        self.dependencies.clone()
    }

    fn create(&self, _: &mut StartupHandle<'_>) -> Result<Service, std::convert::Infallible> {
        self.probe.enter(ID);
        thread::sleep(Duration::from_millis(5));
        self.probe.leave();
        Ok(Service(ID))
    }
}

pub fn slow_key<const ID: usize>() -> TypeInfo {
    TypeInfo::of::<Slow<ID>>()
}

pub fn register_slow<const ID: usize>(
    builder: StartupBuilder,
    probe: &Arc<Probe>,
    dependencies: Vec<TypeInfo>,
) -> StartupBuilder {
    let probe = probe.clone();
    builder.register_with(move || {
        Ok::<_, std::convert::Infallible>(Slow::<ID> {
            dependencies: dependencies.clone(),
            probe: probe.clone(),
        })
    })
}

/// Records trace sections of all threads into one shared log
#[derive(Clone, Default)]
pub struct SharedTrace {
    events: Arc<Mutex<Vec<(ThreadId, Option<String>)>>>,
}
impl SharedTrace {
    pub fn begins(&self) -> usize {
        let events = self.events.lock().unwrap();
        events.iter().filter(|(_, name)| name.is_some()).count()
    }

    /// Returns true if every section was opened and closed by one thread without
    /// sections of another thread in between
    pub fn is_nested(&self) -> bool {
        let events = self.events.lock().unwrap();
        let mut depth = 0usize;
        let mut owner = None;
        for (thread, name) in events.iter() {
            if depth > 0 && owner != Some(*thread) {
                return false;
            }
            match name {
                Some(_) => {
                    owner = Some(*thread);
                    depth += 1;
                }
                None if depth == 0 => return false,
                None => depth -= 1,
            }
        }
        depth == 0
    }
}
impl TraceHook for SharedTrace {
    fn begin_section(&self, name: &str) {
        let mut events = self.events.lock().unwrap();
        events.push((thread::current().id(), Some(name.to_string())));
    }

    fn end_section(&self) {
        self.events.lock().unwrap().push((thread::current().id(), None));
    }
}
