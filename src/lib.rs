//! Loading-context gating and capability probing for a runtime
//! instrumentation engine.
//!
//! Every class-loading event in the host process is filtered through this
//! crate: the [`ContextGate`] answers "should this loading context be
//! skipped entirely", and [`CapabilityMatcher`]s answer "does this context
//! provide capability X" (a set of resources, a type with a field, a type
//! with a method). Answers are memoized per context instance, and the memo
//! never keeps a context alive.

pub mod cache;
pub mod context;
pub mod gate;
pub mod matchers;
pub mod probe;
pub mod resource;
pub mod types;

pub use cache::VerdictCache;
pub use context::{same_context, ContextRef, LoadingContext};
pub use gate::{ContextGate, DelegationMarkers, DEFAULT_DENYLIST};
pub use matchers::{
    has_class_with_field, has_class_with_method, has_classes, named_context, CapabilityMatcher,
    ContextPredicate,
};
pub use probe::{probe, Capability};
pub use resource::type_name_to_resource_path;
pub use types::{MethodInfo, TypeInfo, TypeInfoBuilder, TypeKind};
