//! Integration tests: descriptor tables loaded through the runtime facade
//!
//! Builds raw eight-slot tables the way a compiler back end would and
//! checks dispatch, static initialization and introspection end to end.

use aot_runtime::{CompiledUnit, Runtime, RuntimeConfig};
use class_registry::{class_name_of, debug_repr, MethodEntry, MethodFn, PrimitiveKind, Slot};
use core_types::{RuntimeError, Value};
use platform::CaptureWriter;
use std::cell::Cell;
use std::rc::Rc;

fn runtime() -> Runtime {
    Runtime::with_writers(
        RuntimeConfig::default(),
        CaptureWriter::new(),
        CaptureWriter::new(),
    )
    .unwrap()
}

fn constant(text: &'static str) -> MethodFn {
    Rc::new(move |_, _, _| Ok(Value::string(text)))
}

#[test]
fn raw_table_loads_hierarchy_with_override() {
    let rt = runtime();
    let classes = rt.classes();
    let shape = classes.declare_class("$Shape");
    let circle = classes.declare_class("$Circle");
    let drawable = classes.declare_class("$Drawable");

    let table = vec![
        // interface Drawable
        Slot::Class(drawable),
        Slot::Text("demo.Drawable".into()),
        Slot::Null,
        Slot::ClassList(vec![]),
        Slot::Flags(0),
        Slot::Null,
        Slot::Null,
        Slot::Methods(vec![]),
        // class Shape
        Slot::Class(shape),
        Slot::Text("demo.Shape".into()),
        Slot::Class(rt.object_class()),
        Slot::ClassList(vec![drawable]),
        Slot::Flags(0),
        Slot::Null,
        Slot::Null,
        Slot::Methods(vec![
            MethodEntry::new("name", constant("shape")),
            MethodEntry::new("sides", constant("many")),
        ]),
        // class Circle extends Shape
        Slot::Class(circle),
        Slot::Text("demo.Circle".into()),
        Slot::Class(shape),
        Slot::ClassList(vec![]),
        Slot::Flags(0),
        Slot::Null,
        Slot::Null,
        Slot::Methods(vec![MethodEntry::new("name", constant("circle"))]),
    ];
    rt.load_unit(CompiledUnit::new().with_descriptors(table))
        .unwrap();

    let c = classes.instantiate(circle).unwrap();
    assert_eq!(classes.invoke_virtual(&c, "name", &[]), Ok(Value::string("circle")));
    assert_eq!(classes.invoke_virtual(&c, "sides", &[]), Ok(Value::string("many")));

    let s = classes.instantiate(shape).unwrap();
    assert_eq!(classes.invoke_virtual(&s, "name", &[]), Ok(Value::string("shape")));

    assert!(classes.is_instance(&c, drawable));
    assert!(classes.is_instance(&c, rt.object_class()));
    assert!(!classes.is_instance(&s, circle));
    assert_eq!(class_name_of(classes, &c), "demo.Circle");
}

#[test]
fn aliases_share_one_static_initializer() {
    let rt = runtime();
    let classes = rt.classes();
    let config = classes.declare_class("$Config");
    let runs = Rc::new(Cell::new(0));

    let r = runs.clone();
    let table = vec![
        Slot::Class(config),
        Slot::Text("demo.Config".into()),
        Slot::Null,
        Slot::ClassList(vec![]),
        Slot::Flags(0),
        Slot::Init(Box::new(move |_| {
            r.set(r.get() + 1);
            Ok(())
        })),
        Slot::Names(vec!["A".into(), "B".into()]),
        Slot::Methods(vec![]),
    ];
    rt.load_unit(CompiledUnit::new().with_descriptors(table))
        .unwrap();
    classes.symbols().define("A", Rc::new(|_, _| Ok(Value::Int(1))));
    classes.symbols().define("B", Rc::new(|_, _| Ok(Value::Int(2))));

    assert!(classes.symbols().is_trampoline("A"));
    assert_eq!(classes.call_static("B", &[]), Ok(Value::Int(2)));
    assert_eq!(classes.call_static("A", &[]), Ok(Value::Int(1)));
    assert_eq!(classes.call_static("B", &[]), Ok(Value::Int(2)));
    assert_eq!(runs.get(), 1);
    assert!(!classes.symbols().is_trampoline("B"));
}

#[test]
fn failed_table_leaves_registry_untouched() {
    let rt = runtime();
    let classes = rt.classes();
    let good = classes.declare_class("$Good");
    let table = vec![
        Slot::Class(good),
        Slot::Text("demo.Good".into()),
        Slot::Null,
        Slot::ClassList(vec![]),
        Slot::Flags(0),
        Slot::Null,
        Slot::Null,
        Slot::Methods(vec![]),
        // second group: flags slot holds text
        Slot::Class(good),
        Slot::Text("demo.Bad".into()),
        Slot::Null,
        Slot::ClassList(vec![]),
        Slot::Text("oops".into()),
        Slot::Null,
        Slot::Null,
        Slot::Methods(vec![]),
    ];
    let err = rt
        .load_unit(CompiledUnit::new().with_descriptors(table))
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::MalformedDescriptorTable {
            group: 1,
            field: "flags",
            expected: "flag bits",
        }
    );
    assert!(classes.find_class("demo.Good").is_none());
    assert_eq!(class_name_of(classes, &Value::Null), "null");
}

#[test]
fn nested_arrays_report_source_names() {
    let rt = runtime();
    let classes = rt.classes();
    let int = classes.primitive(PrimitiveKind::Int);
    let row = classes.array_class(int).unwrap();
    let grid = classes.create_array(row, 3).unwrap();

    assert_eq!(class_name_of(classes, &grid), "int[][]");
    assert_eq!(classes.array_class(int), Ok(row));
    assert_eq!(classes.class_name(row).as_deref(), Some("[I"));
    assert_eq!(classes.superclass(row), Some(rt.object_class()));

    let strings = classes.create_array(rt.string_class(), 1).unwrap();
    assert_eq!(class_name_of(classes, &strings), "java.lang.String[]");
    assert!(debug_repr(classes, &grid).starts_with("int[][]"));
}
