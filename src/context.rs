//! The core's view of a loading context: an isolated namespace that resolves
//! names to resources and types. Contexts are owned by the host runtime; this
//! crate only queries them and compares them by identity.

use std::sync::Arc;

use crate::types::TypeInfo;

/// Shared handle to a loading context. All caching in this crate keys off the
/// identity of this handle, not any derived name.
pub type ContextRef = Arc<dyn LoadingContext>;

/// A code-loading namespace, as seen by the gate and the matchers.
///
/// Implementations live in the host runtime. They are read-only from this
/// crate's perspective and are assumed immutable with respect to what they
/// can resolve once published: a context does not retroactively gain or lose
/// a type or resource, which is what makes verdicts cacheable for the life
/// of the context.
pub trait LoadingContext: Send + Sync {
    /// Name of the context's implementation (not of any one instance).
    /// Used only for the gate's denylist and for `named_context`.
    fn implementation_name(&self) -> &str;

    /// Whether `path` resolves to a non-absent resource in this namespace.
    /// `path` is already encoded (see `resource::type_name_to_resource_path`).
    fn has_resource(&self, path: &str) -> bool;

    /// Resolve a fully-qualified type name to its type, or `None` if the
    /// name is unknown in this namespace. Must not trigger the type's
    /// static initialization.
    fn resolve_type(&self, name: &str) -> Option<Arc<TypeInfo>>;
}

/// Identity comparison for context handles.
///
/// Compares thin data pointers only. `Arc::ptr_eq` on trait objects also
/// compares vtable pointers, which can differ for the same instance across
/// codegen units.
pub fn same_context(a: &ContextRef, b: &ContextRef) -> bool {
    context_key(a) == context_key(b)
}

/// The cache key for a context: the address of its referent.
pub(crate) fn context_key(ctx: &ContextRef) -> usize {
    Arc::as_ptr(ctx) as *const () as usize
}
