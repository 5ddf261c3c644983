//! Unit tests for RuntimeError and Exception

use core_types::{ClassId, Exception, RuntimeError};

#[test]
fn thrown_wraps_exception() {
    let err = RuntimeError::thrown("java.lang.ArithmeticException", "/ by zero");
    match err {
        RuntimeError::Thrown(ref e) => {
            assert_eq!(e.class_name, "java.lang.ArithmeticException");
            assert_eq!(e.message, "/ by zero");
        }
        _ => panic!("expected Thrown"),
    }
}

#[test]
fn exception_converts_into_runtime_error() {
    let err: RuntimeError = Exception::new("java.lang.Error", "x").into();
    assert!(matches!(err, RuntimeError::Thrown(_)));
}

#[test]
fn every_non_thrown_variant_is_a_contract_violation() {
    let violations = [
        RuntimeError::AlreadyStarted,
        RuntimeError::ContextAlreadyActive,
        RuntimeError::NotSuspended { status: "Running" },
        RuntimeError::NoActiveContext,
        RuntimeError::StackUnderflow,
        RuntimeError::InvalidRecordedState,
        RuntimeError::InternIndexOutOfRange { index: 1, len: 0 },
        RuntimeError::MalformedDescriptorTable {
            group: 0,
            field: "name",
            expected: "text",
        },
        RuntimeError::UnknownClass(ClassId::new(0)),
        RuntimeError::ClassAlreadyLoaded(ClassId::new(0)),
        RuntimeError::ClassNotLoaded(ClassId::new(0)),
        RuntimeError::CyclicHierarchy(ClassId::new(0)),
        RuntimeError::UnknownSymbol("f".to_string()),
        RuntimeError::MethodNotFound {
            class: ClassId::new(0),
            selector: "m".to_string(),
        },
        RuntimeError::NotAnObject("int"),
    ];
    for err in violations {
        assert!(err.is_contract_violation(), "{err}");
    }
}

#[test]
fn malformed_table_message_names_the_field() {
    let err = RuntimeError::MalformedDescriptorTable {
        group: 2,
        field: "flags",
        expected: "flag bits",
    };
    assert_eq!(
        err.to_string(),
        "malformed descriptor table: class group 2, field flags: expected flag bits"
    );
}

#[test]
fn cyclic_hierarchy_message_names_the_class() {
    let err = RuntimeError::CyclicHierarchy(ClassId::new(12));
    assert_eq!(err.to_string(), "class #12 is its own ancestor");
}
