//! Resolved-type model. A `TypeInfo` stands for one type as loaded by one
//! context; two contexts loading the same name produce two distinct
//! `TypeInfo` instances, so identity (`Arc` pointer) is the equality that
//! matters for delegation checks and method signatures.

use std::sync::Arc;

/// Whether a type is a concrete class or an interface. Method matching
/// differs between the two (see `probe`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

/// A method as declared on a type: name plus resolved parameter types.
/// Parameter types are compared by identity, never by name.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    name: String,
    params: Vec<Arc<TypeInfo>>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, params: Vec<Arc<TypeInfo>>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Arc<TypeInfo>] {
        &self.params
    }

    fn signature_matches(&self, name: &str, params: &[Arc<TypeInfo>]) -> bool {
        self.name == name
            && self.params.len() == params.len()
            && self
                .params
                .iter()
                .zip(params)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

/// One resolved type: its declared members plus the supertypes it inherits
/// from (superclass and implemented interfaces alike).
#[derive(Debug)]
pub struct TypeInfo {
    name: String,
    kind: TypeKind,
    fields: Vec<String>,
    methods: Vec<MethodInfo>,
    supertypes: Vec<Arc<TypeInfo>>,
}

impl TypeInfo {
    pub fn builder(name: impl Into<String>) -> TypeInfoBuilder {
        TypeInfoBuilder {
            name: name.into(),
            kind: TypeKind::Class,
            fields: Vec::new(),
            methods: Vec::new(),
            supertypes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Whether this type itself declares `field`, any visibility.
    /// Inherited fields never count.
    pub fn declares_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Whether this type itself declares a method with this exact signature.
    pub fn declares_method(&self, name: &str, params: &[Arc<TypeInfo>]) -> bool {
        self.methods.iter().any(|m| m.signature_matches(name, params))
    }

    /// Whether this type declares or inherits a method with this exact
    /// signature. Walks the full supertype graph.
    pub fn has_method(&self, name: &str, params: &[Arc<TypeInfo>]) -> bool {
        self.declares_method(name, params)
            || self.supertypes.iter().any(|s| s.has_method(name, params))
    }
}

/// Builds immutable `TypeInfo` instances. Used by host-runtime bindings and
/// by tests fabricating namespaces.
pub struct TypeInfoBuilder {
    name: String,
    kind: TypeKind,
    fields: Vec<String>,
    methods: Vec<MethodInfo>,
    supertypes: Vec<Arc<TypeInfo>>,
}

impl TypeInfoBuilder {
    pub fn kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    pub fn method(mut self, name: impl Into<String>, params: Vec<Arc<TypeInfo>>) -> Self {
        self.methods.push(MethodInfo::new(name, params));
        self
    }

    pub fn supertype(mut self, parent: Arc<TypeInfo>) -> Self {
        self.supertypes.push(parent);
        self
    }

    pub fn build(self) -> Arc<TypeInfo> {
        Arc::new(TypeInfo {
            name: self.name,
            kind: self.kind,
            fields: self.fields,
            methods: self.methods,
            supertypes: self.supertypes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn declared_field_lookup() {
        let t = TypeInfo::builder("com.example.Holder")
            .field("value")
            .build();
        assert!(t.declares_field("value"));
        assert!(!t.declares_field("other"));
    }

    #[test]
    fn method_params_compare_by_identity() {
        let s = TypeInfo::builder("com.example.S").build();
        let same_name = TypeInfo::builder("com.example.S").build();
        let t = TypeInfo::builder("com.example.T")
            .method("accept", vec![s.clone()])
            .build();

        assert!(t.declares_method("accept", &[s]));
        // Same type name loaded elsewhere is a different type.
        assert!(!t.declares_method("accept", &[same_name]));
    }

    #[test]
    fn inherited_method_visible_via_has_method_only() {
        let base = TypeInfo::builder("com.example.Base")
            .method("close", vec![])
            .build();
        let sub = TypeInfo::builder("com.example.Sub")
            .supertype(base)
            .build();

        assert!(!sub.declares_method("close", &[]));
        assert!(sub.has_method("close", &[]));
    }

    #[test]
    fn builder_defaults_to_class() {
        let t = TypeInfo::builder("com.example.X").build();
        assert_eq!(t.kind(), TypeKind::Class);
        assert!(!t.is_interface());
    }
}
