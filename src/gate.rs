//! The skip decision: is a loading context eligible for instrumentation at
//! all? Built once at process start by the instrumentation-selection layer
//! and shared for the life of the process.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::cache::VerdictCache;
use crate::context::{same_context, ContextRef};
use crate::probe::fail_closed;

/// Context implementations that are never useful instrumentation targets:
/// delegating and reflection-shim loaders that exist only to forward to
/// another namespace.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "org.codehaus.groovy.runtime.callsite.CallSiteClassLoader",
    "sun.reflect.DelegatingClassLoader",
    "jdk.internal.reflect.DelegatingClassLoader",
];

/// The two marker type names used to detect bootstrap delegation: the
/// tracing bootstrap's cross-cutting API type and its internal logging
/// utility type. Supplied by the bootstrap layer; versionless.
#[derive(Debug, Clone)]
pub struct DelegationMarkers {
    pub api_type: String,
    pub logger_type: String,
}

impl DelegationMarkers {
    pub fn new(api_type: impl Into<String>, logger_type: impl Into<String>) -> Self {
        Self {
            api_type: api_type.into(),
            logger_type: logger_type.into(),
        }
    }
}

/// Decides whether instrumentation should skip a loading context entirely.
///
/// A context is skipped when it does not delegate to the bootstrap context
/// for the bootstrap's own types: instrumented code injected into such a
/// context could not resolve the tracing API at run time. The verdict is
/// memoized per context instance in a cache shared by all callers.
pub struct ContextGate {
    bootstrap: ContextRef,
    markers: DelegationMarkers,
    denylist: HashSet<String>,
    cache: VerdictCache,
}

impl ContextGate {
    pub fn new(bootstrap: ContextRef, markers: DelegationMarkers) -> Self {
        Self {
            bootstrap,
            markers,
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            cache: VerdictCache::new(),
        }
    }

    /// Add a context implementation name that is always skipped. The host
    /// registers its own agent loader here.
    pub fn with_skipped_implementation(mut self, name: impl Into<String>) -> Self {
        self.denylist.insert(name.into());
        self
    }

    /// The distinguished root/bootstrap context, for identity comparisons
    /// by callers.
    pub fn bootstrap(&self) -> &ContextRef {
        &self.bootstrap
    }

    /// Should artifacts loaded through `context` be left uninstrumented?
    pub fn should_skip(&self, context: &ContextRef) -> bool {
        // Bootstrap is always instrumentable and never cached or probed.
        if same_context(context, &self.bootstrap) {
            return false;
        }
        if self.denylist.contains(context.implementation_name()) {
            debug!(
                implementation = context.implementation_name(),
                "skipping denylisted context implementation"
            );
            return true;
        }
        self.cache.get_or_compute(context, || {
            let skip = !fail_closed(|| self.delegates_to_bootstrap(context));
            if skip {
                debug!(
                    implementation = context.implementation_name(),
                    "skipping context instance: does not delegate to bootstrap"
                );
            }
            skip
        })
    }

    /// Live entry count of the shared skip cache.
    pub fn cached_contexts(&self) -> usize {
        self.cache.len()
    }

    /// Both markers are checked unconditionally so each failure gets its
    /// own diagnostic; either failing means "does not delegate".
    fn delegates_to_bootstrap(&self, context: &ContextRef) -> bool {
        let mut delegates = true;
        for marker in [&self.markers.api_type, &self.markers.logger_type] {
            if !self.resolves_bootstrap_type(context, marker) {
                debug!(
                    implementation = context.implementation_name(),
                    marker = marker.as_str(),
                    "context failed to delegate bootstrap marker type"
                );
                delegates = false;
            }
        }
        delegates
    }

    /// `context` must yield the identical type instance the bootstrap
    /// yields, not merely a same-named type loaded elsewhere.
    fn resolves_bootstrap_type(&self, context: &ContextRef, name: &str) -> bool {
        match (context.resolve_type(name), self.bootstrap.resolve_type(name)) {
            (Some(via_context), Some(via_bootstrap)) => {
                Arc::ptr_eq(&via_context, &via_bootstrap)
            }
            _ => false,
        }
    }
}
