//! Name-to-path encoding for resource lookups. The algorithm belongs to the
//! surrounding system; this is its standard rendition.

/// Convert a dotted type name into the path a loading context uses to look
/// up the type's backing resource: `a.b.C` -> `a/b/C.class`.
pub fn type_name_to_resource_path(name: &str) -> String {
    let mut path = name.replace('.', "/");
    path.push_str(".class");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encodes_dotted_name() {
        assert_eq!(
            type_name_to_resource_path("com.example.Foo"),
            "com/example/Foo.class"
        );
    }

    #[test]
    fn encodes_undotted_name() {
        assert_eq!(type_name_to_resource_path("Foo"), "Foo.class");
    }
}
