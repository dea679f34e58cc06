//! Fabricated loading contexts for the integration suite: configurable
//! namespaces with lookup counters, a recorded request log, and an optional
//! panic mode for asserting that a probe was never reached.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use context_gate::{ContextRef, LoadingContext, TypeInfo};

pub struct FakeContext {
    name: String,
    resources: HashSet<String>,
    types: HashMap<String, Arc<TypeInfo>>,
    resource_lookups: AtomicUsize,
    type_lookups: AtomicUsize,
    requested_resources: Mutex<Vec<String>>,
    panic_on_lookup: bool,
}

impl FakeContext {
    pub fn builder(name: &str) -> FakeContextBuilder {
        FakeContextBuilder {
            name: name.to_string(),
            resources: HashSet::new(),
            types: HashMap::new(),
            panic_on_lookup: false,
        }
    }

    pub fn resource_lookups(&self) -> usize {
        self.resource_lookups.load(Ordering::SeqCst)
    }

    pub fn type_lookups(&self) -> usize {
        self.type_lookups.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.resource_lookups() + self.type_lookups()
    }

    /// Every path `has_resource` was asked about, in order.
    pub fn requested_resources(&self) -> Vec<String> {
        self.requested_resources.lock().unwrap().clone()
    }
}

impl LoadingContext for FakeContext {
    fn implementation_name(&self) -> &str {
        &self.name
    }

    fn has_resource(&self, path: &str) -> bool {
        if self.panic_on_lookup {
            panic!("unexpected resource lookup: {path}");
        }
        self.resource_lookups.fetch_add(1, Ordering::SeqCst);
        self.requested_resources.lock().unwrap().push(path.to_string());
        self.resources.contains(path)
    }

    fn resolve_type(&self, name: &str) -> Option<Arc<TypeInfo>> {
        if self.panic_on_lookup {
            panic!("unexpected type lookup: {name}");
        }
        self.type_lookups.fetch_add(1, Ordering::SeqCst);
        self.types.get(name).cloned()
    }
}

pub struct FakeContextBuilder {
    name: String,
    resources: HashSet<String>,
    types: HashMap<String, Arc<TypeInfo>>,
    panic_on_lookup: bool,
}

impl FakeContextBuilder {
    pub fn resource(mut self, path: &str) -> Self {
        self.resources.insert(path.to_string());
        self
    }

    pub fn type_info(mut self, ty: Arc<TypeInfo>) -> Self {
        self.types.insert(ty.name().to_string(), ty);
        self
    }

    /// Any lookup panics. For contexts that must never be probed.
    pub fn panic_on_lookup(mut self) -> Self {
        self.panic_on_lookup = true;
        self
    }

    pub fn build(self) -> Arc<FakeContext> {
        Arc::new(FakeContext {
            name: self.name,
            resources: self.resources,
            types: self.types,
            resource_lookups: AtomicUsize::new(0),
            type_lookups: AtomicUsize::new(0),
            requested_resources: Mutex::new(Vec::new()),
            panic_on_lookup: self.panic_on_lookup,
        })
    }
}

/// Coerce a fake into the handle type the crate's API takes.
pub fn as_context(fake: &Arc<FakeContext>) -> ContextRef {
    fake.clone()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
