//! Diagnostic helpers: display names of runtime values.

use crate::ClassRegistry;
use core_types::{ClassId, Value};

/// Display name of a class: the primitive keyword, the qualified name, or
/// `@raw_name` for a class declared but never loaded.
pub fn display_name(registry: &ClassRegistry, class: ClassId) -> String {
    if let Some(kind) = registry.primitive_kind(class) {
        return kind.name().to_string();
    }
    match registry.descriptor(class) {
        Ok(desc) => match desc.meta() {
            Some(meta) => meta.name.clone(),
            None => format!("@{}", desc.raw_name()),
        },
        Err(_) => format!("@{}", class),
    }
}

/// Source-style class name of a value, e.g. `int[][]` or `demo.Point`.
///
/// Array classes are unwrapped through their item links down to the leaf
/// type, and one `[]` is appended per level. Values without a class (null,
/// or strings before `java.lang.String` is loaded) report their kind.
///
/// # Examples
///
/// ```
/// use class_registry::{class_name_of, ClassRegistry, PrimitiveKind};
/// use core_types::Value;
///
/// let registry = ClassRegistry::new();
/// let int = registry.primitive(PrimitiveKind::Int);
/// let row = registry.array_class(int).unwrap();
/// let grid = registry.create_array(row, 2).unwrap();
///
/// assert_eq!(class_name_of(&registry, &grid), "int[][]");
/// assert_eq!(class_name_of(&registry, &Value::Long(1)), "long");
/// ```
pub fn class_name_of(registry: &ClassRegistry, value: &Value) -> String {
    let Some(mut class) = registry.class_of(value) else {
        return value.kind_name().to_string();
    };
    let mut degree = 0;
    while let Some(item) = registry.item_type(class) {
        degree += 1;
        class = item;
    }
    let mut name = display_name(registry, class);
    for _ in 0..degree {
        name.push_str("[]");
    }
    name
}

/// Diagnostic string form of a value.
pub fn debug_repr(registry: &ClassRegistry, value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", &**s),
        Value::Object(_) | Value::Array(_) | Value::Class(_) => {
            format!("{} {}", class_name_of(registry, value), value)
        }
        other => other.to_string(),
    }
}
