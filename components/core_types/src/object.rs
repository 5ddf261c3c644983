//! Heap objects: class ids, instances, arrays and class handles.

use crate::Value;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;

/// Index of a class descriptor in the class registry arena.
///
/// Ids are handed out by the registry and stay valid for the lifetime of
/// the process; descriptors are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    /// Wraps a raw arena index.
    pub const fn new(index: usize) -> Self {
        ClassId(index)
    }

    /// The raw arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An instance of a loaded class.
///
/// Fields are keyed by their compiled name. Methods are not stored on the
/// instance; virtual calls resolve through the class registry.
#[derive(Debug)]
pub struct Instance {
    class: ClassId,
    fields: RefCell<HashMap<String, Value>>,
}

impl Instance {
    /// Creates an instance with no fields set.
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// The dynamic class of this instance.
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Reads a field; unset fields read as `None`.
    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    /// Writes a field, returning the previous value.
    pub fn set_field(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.borrow_mut().insert(name.into(), value)
    }
}

/// An array instance. `class` is the array class, not the item class.
#[derive(Debug)]
pub struct ArrayObject {
    class: ClassId,
    data: RefCell<Vec<Value>>,
}

impl ArrayObject {
    /// Wraps existing element storage.
    pub fn new(class: ClassId, data: Vec<Value>) -> Self {
        Self {
            class,
            data: RefCell::new(data),
        }
    }

    /// The array class of this array.
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Returns true when the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    /// Element at `index`, or `None` when out of bounds.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.data.borrow().get(index).cloned()
    }

    /// Stores `value` at `index`. Returns false when out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.data.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Borrows the element storage.
    pub fn data(&self) -> Ref<'_, Vec<Value>> {
        self.data.borrow()
    }

    /// Mutably borrows the element storage.
    pub fn data_mut(&self) -> RefMut<'_, Vec<Value>> {
        self.data.borrow_mut()
    }
}

/// Reflection handle for a class (`Foo.class`).
///
/// The registry memoizes one handle per class, so handles for the same
/// class are reference-identical.
#[derive(Debug)]
pub struct ClassObject {
    class: ClassId,
}

impl ClassObject {
    /// Creates a handle; callers should go through the registry instead.
    pub fn new(class: ClassId) -> Self {
        Self { class }
    }

    /// The class this handle reflects.
    pub fn class(&self) -> ClassId {
        self.class
    }
}
