//! Unit tests for virtual dispatch, assignability and arrays

use class_registry::{ClassRecord, ClassRegistry, MethodEntry, MethodFn, PrimitiveKind};
use core_types::{RuntimeError, Value};
use std::rc::Rc;

fn returns(s: &'static str) -> MethodFn {
    Rc::new(move |_, _, _| Ok(Value::string(s)))
}

#[test]
fn subclass_entry_overrides_superclass_entry() {
    let registry = ClassRegistry::new();
    let base = registry.declare_class("Base");
    let sub = registry.declare_class("Sub");
    registry
        .load_classes(vec![
            ClassRecord::new(base, "demo.Base")
                .with_method(MethodEntry::new("foo", returns("base")))
                .with_method(MethodEntry::new("bar", returns("base-bar"))),
            ClassRecord::new(sub, "demo.Sub")
                .with_superclass(base)
                .with_method(MethodEntry::new("foo", returns("sub"))),
        ])
        .unwrap();

    let obj = registry.instantiate(sub).unwrap();
    assert_eq!(registry.invoke_virtual(&obj, "foo", &[]), Ok(Value::string("sub")));
    assert_eq!(
        registry.invoke_virtual(&obj, "bar", &[]),
        Ok(Value::string("base-bar"))
    );

    let base_obj = registry.instantiate(base).unwrap();
    assert_eq!(
        registry.invoke_virtual(&base_obj, "foo", &[]),
        Ok(Value::string("base"))
    );
}

#[test]
fn subclass_loaded_before_superclass_still_inherits() {
    let registry = ClassRegistry::new();
    let base = registry.declare_class("Base");
    let sub = registry.declare_class("Sub");
    registry
        .load_classes(vec![ClassRecord::new(sub, "demo.Sub").with_superclass(base)])
        .unwrap();
    registry
        .load_classes(vec![
            ClassRecord::new(base, "demo.Base").with_method(MethodEntry::new("foo", returns("base")))
        ])
        .unwrap();

    let obj = registry.instantiate(sub).unwrap();
    assert_eq!(registry.invoke_virtual(&obj, "foo", &[]), Ok(Value::string("base")));
}

#[test]
fn bridge_aliases_share_an_implementation() {
    let registry = ClassRegistry::new();
    let a = registry.declare_class("A");
    registry
        .load_classes(vec![ClassRecord::new(a, "demo.A").with_method(MethodEntry::aliased(
            &["get()Ljava/lang/Object;", "get()Ljava/lang/String;"],
            returns("v"),
        ))])
        .unwrap();
    let obj = registry.instantiate(a).unwrap();
    assert_eq!(
        registry.invoke_virtual(&obj, "get()Ljava/lang/Object;", &[]),
        registry.invoke_virtual(&obj, "get()Ljava/lang/String;", &[])
    );
}

#[test]
fn methods_receive_receiver_and_arguments() {
    let registry = ClassRegistry::new();
    let a = registry.declare_class("A");
    let add: MethodFn = Rc::new(|_, this, args| {
        let Value::Object(obj) = this else {
            return Err(RuntimeError::NotAnObject(this.kind_name()));
        };
        let base = obj.get_field("base").and_then(|v| v.as_int()).unwrap_or(0);
        Ok(Value::Int(base + args[0].as_int().unwrap_or(0)))
    });
    registry
        .load_classes(vec![ClassRecord::new(a, "demo.A").with_method(MethodEntry::new("add", add))])
        .unwrap();

    let obj = registry.instantiate(a).unwrap();
    if let Value::Object(inst) = &obj {
        inst.set_field("base", Value::Int(10));
    }
    assert_eq!(
        registry.invoke_virtual(&obj, "add", &[Value::Int(5)]),
        Ok(Value::Int(15))
    );
}

#[test]
fn missing_selector_reports_class() {
    let registry = ClassRegistry::new();
    let a = registry.declare_class("A");
    registry.load_classes(vec![ClassRecord::new(a, "demo.A")]).unwrap();
    let obj = registry.instantiate(a).unwrap();
    assert_eq!(
        registry.invoke_virtual(&obj, "nope", &[]),
        Err(RuntimeError::MethodNotFound {
            class: a,
            selector: "nope".to_string(),
        })
    );
}

#[test]
fn assignability_follows_interfaces_transitively() {
    let registry = ClassRegistry::new();
    let collection = registry.declare_class("Collection");
    let list = registry.declare_class("List");
    let base = registry.declare_class("AbstractList");
    let array_list = registry.declare_class("ArrayList");
    let other = registry.declare_class("Other");
    registry
        .load_classes(vec![
            ClassRecord::new(collection, "java.util.Collection"),
            ClassRecord::new(list, "java.util.List").with_supertypes(vec![collection]),
            ClassRecord::new(base, "java.util.AbstractList"),
            ClassRecord::new(array_list, "java.util.ArrayList")
                .with_superclass(base)
                .with_supertypes(vec![list]),
            ClassRecord::new(other, "demo.Other"),
        ])
        .unwrap();

    assert!(registry.is_assignable(array_list, collection));
    assert!(registry.is_assignable(array_list, base));
    assert!(registry.is_assignable(list, list));
    assert!(!registry.is_assignable(collection, list));
    assert!(!registry.is_assignable(other, collection));

    let obj = registry.instantiate(array_list).unwrap();
    assert!(registry.is_instance(&obj, collection));
    assert!(!registry.is_instance(&Value::Null, collection));
}

#[test]
fn arrays_extend_object_when_it_is_loaded() {
    let registry = ClassRegistry::new();
    let object = registry.declare_class("Object");
    registry
        .load_classes(vec![ClassRecord::new(object, "java.lang.Object")])
        .unwrap();
    let int = registry.primitive(PrimitiveKind::Int);
    let int_array = registry.array_class(int).unwrap();

    assert_eq!(registry.superclass(int_array), Some(object));
    assert!(registry.is_assignable(int_array, object));
    let arr = registry.create_array(int, 3).unwrap();
    assert!(registry.is_instance(&arr, object));
}

#[test]
fn nested_array_names() {
    let registry = ClassRegistry::new();
    let int = registry.primitive(PrimitiveKind::Int);
    let row = registry.array_class(int).unwrap();
    let grid = registry.array_class(row).unwrap();
    assert_eq!(registry.class_name(grid).as_deref(), Some("[[I"));
    assert_eq!(registry.item_type(grid), Some(row));
}

#[test]
fn wrap_array_keeps_elements() {
    let registry = ClassRegistry::new();
    let char_kind = registry.primitive(PrimitiveKind::Char);
    let Value::Array(arr) = registry
        .wrap_array(char_kind, vec![Value::Char(104), Value::Char(105)])
        .unwrap()
    else {
        panic!("expected array");
    };
    assert_eq!(arr.len(), 2);
    assert_eq!(registry.item_type(arr.class()), Some(char_kind));
}

#[test]
fn class_objects_are_reference_stable() {
    let registry = ClassRegistry::new();
    let a = registry.declare_class("A");
    let first = registry.class_object(a).unwrap();
    let second = registry.class_object(a).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert!(Value::Class(first).same_ref(&Value::Class(second)));
}
