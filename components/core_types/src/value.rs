//! Runtime value representation.
//!
//! This module provides the `Value` enum that compiled code pushes onto
//! operand stacks, passes to methods and stores in object fields.

use crate::object::{ArrayObject, ClassObject, Instance};
use std::fmt;
use std::rc::Rc;

/// Represents any value a compiled program can hold.
///
/// Primitives are stored inline. Strings, objects, arrays and class handles
/// are reference counted so that identity (`same_ref`) is observable, which
/// generated code relies on for interned strings and `==` on references.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let n = Value::Int(42);
/// assert_eq!(n.to_string(), "42");
/// assert!(Value::Null.is_null());
/// assert_eq!(Value::Long(7).kind_name(), "long");
/// ```
#[derive(Clone)]
pub enum Value {
    /// Result of a method with no return value
    Void,
    /// The null reference
    Null,
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `short`
    Short(i16),
    /// `char` (one UTF-16 code unit)
    Char(u16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// String reference
    String(Rc<str>),
    /// Instance of a loaded class
    Object(Rc<Instance>),
    /// Array instance
    Array(Rc<ArrayObject>),
    /// Reflection handle of a class
    Class(Rc<ClassObject>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "Void"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Byte(n) => f.debug_tuple("Byte").field(n).finish(),
            Value::Short(n) => f.debug_tuple("Short").field(n).finish(),
            Value::Char(c) => f.debug_tuple("Char").field(c).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Long(n) => f.debug_tuple("Long").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(&&**s).finish(),
            Value::Object(obj) => f.debug_tuple("Object").field(&obj.class()).finish(),
            Value::Array(arr) => f
                .debug_struct("Array")
                .field("class", &arr.class())
                .field("len", &arr.len())
                .finish(),
            Value::Class(cls) => f.debug_tuple("Class").field(&cls.class()).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Creates a string value from anything that converts into `Rc<str>`.
    ///
    /// The result is not interned; use a string pool for literal identity.
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Returns true for the null reference.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Reference identity, the semantics of `==` on references.
    ///
    /// Two strings are the same reference only when they share an
    /// allocation, which is what interning guarantees for literals.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    /// use std::rc::Rc;
    ///
    /// let s: Rc<str> = Rc::from("abc");
    /// let a = Value::String(s.clone());
    /// let b = Value::String(s);
    /// let c = Value::string("abc");
    /// assert!(a.same_ref(&b));
    /// assert!(!a.same_ref(&c));
    /// assert_eq!(a, c);
    /// ```
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }

    /// Short name of the value's kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Char(_) => "char",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Class(_) => "class",
        }
    }

    /// Returns the `int` payload, if this is an `Int`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the `long` payload, if this is a `Long`.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Display form used by `debug_repr` and by the demo program.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// assert_eq!(Value::Null.to_string(), "null");
/// assert_eq!(Value::Boolean(true).to_string(), "true");
/// assert_eq!(Value::Char(0x41).to_string(), "A");
/// assert_eq!(Value::Long(-3).to_string(), "-3");
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Byte(n) => write!(f, "{}", n),
            Value::Short(n) => write!(f, "{}", n),
            Value::Char(c) => {
                let decoded = char::decode_utf16([*c])
                    .next()
                    .and_then(|r| r.ok())
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                write!(f, "{}", decoded)
            }
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Double(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(obj) => write!(f, "object@{}", obj.class().index()),
            Value::Array(arr) => write!(f, "array@{}[{}]", arr.class().index(), arr.len()),
            Value::Class(cls) => write!(f, "class@{}", cls.class().index()),
        }
    }
}
