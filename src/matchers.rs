//! Reusable capability predicates for the instrumentation-selection layer.
//! Each matcher instance owns its own verdict cache, so the same descriptor
//! constructed twice probes twice but each instance settles after one probe
//! per context.

use crate::cache::VerdictCache;
use crate::context::ContextRef;
use crate::probe::{fail_closed, probe, Capability};

/// A yes/no question about a loading context. `None` means "no context
/// available" and never matches; this is distinct from the bootstrap
/// sentinel, which is a real context.
pub trait ContextPredicate: Send + Sync {
    fn matches(&self, context: Option<&ContextRef>) -> bool;
}

/// One capability question with a per-instance memo of answers.
pub struct CapabilityMatcher {
    capability: Capability,
    cache: VerdictCache,
}

impl CapabilityMatcher {
    fn new(capability: Capability) -> Self {
        Self {
            capability,
            cache: VerdictCache::new(),
        }
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    pub fn matches(&self, context: Option<&ContextRef>) -> bool {
        let Some(context) = context else {
            return false;
        };
        self.cache
            .get_or_compute(context, || {
                fail_closed(|| probe(context.as_ref(), &self.capability))
            })
    }

    /// Live entry count of this matcher's cache.
    pub fn cached_contexts(&self) -> usize {
        self.cache.len()
    }
}

impl ContextPredicate for CapabilityMatcher {
    fn matches(&self, context: Option<&ContextRef>) -> bool {
        CapabilityMatcher::matches(self, context)
    }
}

/// Matches contexts that can resolve every named type's backing resource.
pub fn has_classes<I, S>(names: I) -> CapabilityMatcher
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CapabilityMatcher::new(Capability::ResourceSet {
        names: names.into_iter().map(Into::into).collect(),
    })
}

/// Matches contexts whose resolution of `type_name` declares `field_name`.
pub fn has_class_with_field(
    type_name: impl Into<String>,
    field_name: impl Into<String>,
) -> CapabilityMatcher {
    CapabilityMatcher::new(Capability::FieldOn {
        type_name: type_name.into(),
        field_name: field_name.into(),
    })
}

/// Matches contexts whose resolution of `type_name` provides
/// `method_name(param_type_names...)` exactly.
pub fn has_class_with_method<I, S>(
    type_name: impl Into<String>,
    method_name: impl Into<String>,
    param_type_names: I,
) -> CapabilityMatcher
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CapabilityMatcher::new(Capability::MethodOn {
        type_name: type_name.into(),
        method_name: method_name.into(),
        param_type_names: param_type_names.into_iter().map(Into::into).collect(),
    })
}

/// Matches a context by its implementation name alone. A plain string
/// compare; nothing to cache.
pub struct NamedContext {
    name: String,
}

pub fn named_context(name: impl Into<String>) -> NamedContext {
    NamedContext { name: name.into() }
}

impl ContextPredicate for NamedContext {
    fn matches(&self, context: Option<&ContextRef>) -> bool {
        context.is_some_and(|c| c.implementation_name() == self.name)
    }
}
