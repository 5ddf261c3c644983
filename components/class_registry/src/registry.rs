//! The class registry: an arena of class descriptors linked by index.
//!
//! Dispatch resolution walks superclass links explicitly; nothing is copied
//! from ancestors into a subclass at load time. Array classes are created on
//! demand and memoized on their item class.

use crate::descriptor::{ClassDescriptor, ClassMeta, MethodFn, PrimitiveKind};
use crate::symbols::SymbolTable;
use core_types::{ArrayObject, ClassId, ClassObject, Instance, Result, RuntimeError, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Name under which the root class is looked up for array superclasses.
pub const OBJECT_CLASS_NAME: &str = "java.lang.Object";
/// Name under which string values resolve their class.
pub const STRING_CLASS_NAME: &str = "java.lang.String";
/// Name under which class handles resolve their class.
pub const CLASS_CLASS_NAME: &str = "java.lang.Class";

/// Process-lifetime registry of class descriptors and global entry points.
///
/// All methods take `&self`: loading happens in a single-threaded phase and
/// no internal borrow is held while user code (initializers, methods) runs.
///
/// # Examples
///
/// ```
/// use class_registry::{ClassRegistry, ClassRecord, MethodEntry};
/// use core_types::Value;
/// use std::rc::Rc;
///
/// let registry = ClassRegistry::new();
/// let base = registry.declare_class("Base");
/// let derived = registry.declare_class("Derived");
///
/// registry.load_classes(vec![
///     ClassRecord::new(base, "demo.Base")
///         .with_method(MethodEntry::new("name", Rc::new(|_, _, _| Ok(Value::string("base"))))),
///     ClassRecord::new(derived, "demo.Derived")
///         .with_superclass(base)
///         .with_method(MethodEntry::new("name", Rc::new(|_, _, _| Ok(Value::string("derived"))))),
/// ]).unwrap();
///
/// let obj = registry.instantiate(derived).unwrap();
/// assert_eq!(registry.invoke_virtual(&obj, "name", &[]).unwrap(), Value::string("derived"));
/// assert!(registry.is_assignable(derived, base));
/// ```
pub struct ClassRegistry {
    classes: RefCell<Vec<Rc<ClassDescriptor>>>,
    by_name: RefCell<HashMap<String, ClassId>>,
    symbols: SymbolTable,
}

impl ClassRegistry {
    /// Creates a registry holding only the primitive descriptors.
    pub fn new() -> Self {
        let registry = Self {
            classes: RefCell::new(Vec::new()),
            by_name: RefCell::new(HashMap::new()),
            symbols: SymbolTable::new(),
        };
        for kind in PrimitiveKind::ALL {
            let meta = ClassMeta {
                name: kind.name().to_string(),
                binary_name: kind.binary_name().to_string(),
                superclass: None,
                supertypes: Vec::new(),
                is_enum: false,
                primitive: Some(kind),
                item: None,
                dispatch: HashMap::new(),
            };
            registry.declare_loaded(kind.name().to_string(), meta);
        }
        registry
    }

    /// Reserves a descriptor for a class the producer is about to describe.
    ///
    /// The class has no metadata until bootstrap loads it; until then its
    /// display name is `@raw_name`.
    pub fn declare_class(&self, raw_name: &str) -> ClassId {
        let mut classes = self.classes.borrow_mut();
        let id = ClassId::new(classes.len());
        classes.push(Rc::new(ClassDescriptor::new(id, raw_name.to_string())));
        id
    }

    /// Adds a descriptor that is born with its metadata. Not registered by
    /// name.
    fn declare_loaded(&self, raw_name: String, meta: ClassMeta) -> ClassId {
        let mut classes = self.classes.borrow_mut();
        let id = ClassId::new(classes.len());
        classes.push(Rc::new(ClassDescriptor::loaded(id, raw_name, meta)));
        id
    }

    /// Looks up a descriptor by id.
    pub fn descriptor(&self, id: ClassId) -> Result<Rc<ClassDescriptor>> {
        self.classes
            .borrow()
            .get(id.index())
            .cloned()
            .ok_or(RuntimeError::UnknownClass(id))
    }

    /// Number of descriptors, primitives included.
    pub fn len(&self) -> usize {
        self.classes.borrow().len()
    }

    /// Whether the registry holds no descriptors. Never true after `new`.
    pub fn is_empty(&self) -> bool {
        self.classes.borrow().is_empty()
    }

    /// The global entry points.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Calls a global entry point by name.
    pub fn call_static(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.symbols.call(self, name, args)
    }

    /// The descriptor of a primitive type.
    pub fn primitive(&self, kind: PrimitiveKind) -> ClassId {
        ClassId::new(kind.index())
    }

    /// The primitive kind of `id`, if it is a primitive descriptor.
    pub fn primitive_kind(&self, id: ClassId) -> Option<PrimitiveKind> {
        self.descriptor(id).ok()?.meta()?.primitive
    }

    /// Finds a loaded class by qualified name.
    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.by_name.borrow().get(name).copied()
    }

    /// Qualified name of a loaded class.
    pub fn class_name(&self, id: ClassId) -> Option<String> {
        Some(self.descriptor(id).ok()?.meta()?.name.clone())
    }

    /// Direct superclass of a loaded class.
    pub fn superclass(&self, id: ClassId) -> Option<ClassId> {
        self.descriptor(id).ok()?.meta()?.superclass
    }

    /// Element class of an array class.
    pub fn item_type(&self, id: ClassId) -> Option<ClassId> {
        self.descriptor(id).ok()?.meta()?.item
    }

    pub(crate) fn attach_meta(&self, id: ClassId, meta: ClassMeta) -> Result<()> {
        let desc = self.descriptor(id)?;
        let name = meta.name.clone();
        desc.attach(meta)
            .map_err(|_| RuntimeError::ClassAlreadyLoaded(id))?;
        self.by_name.borrow_mut().insert(name, id);
        Ok(())
    }

    /// Runs the static initializer of `id` if it has not run yet.
    ///
    /// The initializer is taken out of the descriptor before it runs, so a
    /// trigger reached while it is running (or after it failed) is a no-op.
    pub fn initialize(&self, id: ClassId) -> Result<()> {
        let desc = self.descriptor(id)?;
        match desc.take_static_init() {
            Some(init) => {
                debug!(class = %id, raw_name = desc.raw_name(), "running static initializer");
                init(self)
            }
            None => Ok(()),
        }
    }

    /// Resolves `selector` starting at `class` and walking up the
    /// superclass chain. The nearest declaration wins.
    pub fn resolve_method(&self, class: ClassId, selector: &str) -> Option<MethodFn> {
        let mut current = Some(class);
        while let Some(id) = current {
            let desc = self.descriptor(id).ok()?;
            let meta = desc.meta()?;
            if let Some(method) = meta.own_method(selector) {
                return Some(method.clone());
            }
            current = meta.superclass;
        }
        None
    }

    /// Virtual call: resolves `selector` on the receiver's dynamic class.
    pub fn invoke_virtual(&self, receiver: &Value, selector: &str, args: &[Value]) -> Result<Value> {
        let class = match receiver {
            Value::Object(obj) => obj.class(),
            Value::Array(arr) => arr.class(),
            other => return Err(RuntimeError::NotAnObject(other.kind_name())),
        };
        let method = self
            .resolve_method(class, selector)
            .ok_or_else(|| RuntimeError::MethodNotFound {
                class,
                selector: selector.to_string(),
            })?;
        trace!(%class, selector, "virtual call");
        method(self, receiver, args)
    }

    /// Allocates an instance of a loaded class. Does not run the static
    /// initializer; constructors reached through aliases do that.
    pub fn instantiate(&self, class: ClassId) -> Result<Value> {
        let desc = self.descriptor(class)?;
        if !desc.is_loaded() {
            return Err(RuntimeError::ClassNotLoaded(class));
        }
        Ok(Value::Object(Rc::new(Instance::new(class))))
    }

    /// The array class whose elements are `item`, created on first request.
    pub fn array_class(&self, item: ClassId) -> Result<ClassId> {
        let item_desc = self.descriptor(item)?;
        if let Some(existing) = item_desc.array_class() {
            return Ok(existing);
        }
        let item_meta = item_desc.meta().ok_or(RuntimeError::ClassNotLoaded(item))?;
        let name = format!("[{}", item_meta.binary_name);
        let object = self.find_class(OBJECT_CLASS_NAME);

        let meta = ClassMeta {
            binary_name: name.clone(),
            name: name.clone(),
            superclass: object,
            supertypes: object.into_iter().collect(),
            is_enum: false,
            primitive: None,
            item: Some(item),
            dispatch: HashMap::new(),
        };
        // Array classes are not registered by name; lookups go through the item.
        let id = self.declare_loaded(name, meta);
        item_desc.set_array_class(id);
        trace!(%item, array = %id, "created array class");
        Ok(id)
    }

    /// Allocates an array of `len` elements of `item`, filled with the
    /// item type's default (zero for primitives, null otherwise).
    pub fn create_array(&self, item: ClassId, len: usize) -> Result<Value> {
        let class = self.array_class(item)?;
        let fill = self
            .primitive_kind(item)
            .map(PrimitiveKind::default_value)
            .unwrap_or(Value::Null);
        Ok(Value::Array(Rc::new(ArrayObject::new(class, vec![fill; len]))))
    }

    /// Wraps existing elements in an array of `item`.
    pub fn wrap_array(&self, item: ClassId, data: Vec<Value>) -> Result<Value> {
        let class = self.array_class(item)?;
        Ok(Value::Array(Rc::new(ArrayObject::new(class, data))))
    }

    /// Whether a value of class `from` may be stored where `to` is expected.
    pub fn is_assignable(&self, from: ClassId, to: ClassId) -> bool {
        if from == to {
            return true;
        }
        let Ok(desc) = self.descriptor(from) else {
            return false;
        };
        let Some(meta) = desc.meta() else {
            return false;
        };
        meta.supertypes.iter().any(|&s| self.is_assignable(s, to))
    }

    /// `instanceof`: false for null and for primitive values.
    pub fn is_instance(&self, value: &Value, class: ClassId) -> bool {
        match value {
            Value::Object(_) | Value::Array(_) | Value::String(_) | Value::Class(_) => self
                .class_of(value)
                .is_some_and(|c| self.is_assignable(c, class)),
            _ => false,
        }
    }

    /// The dynamic class of a value. Primitive values map to their
    /// primitive descriptor; strings and class handles map to their
    /// library classes when those are loaded.
    pub fn class_of(&self, value: &Value) -> Option<ClassId> {
        match value {
            Value::Object(obj) => Some(obj.class()),
            Value::Array(arr) => Some(arr.class()),
            Value::String(_) => self.find_class(STRING_CLASS_NAME),
            Value::Class(_) => self.find_class(CLASS_CLASS_NAME),
            Value::Void => Some(self.primitive(PrimitiveKind::Void)),
            Value::Null => None,
            other => PrimitiveKind::of_value(other).map(|k| self.primitive(k)),
        }
    }

    /// The reflection handle of `id`, created once.
    pub fn class_object(&self, id: ClassId) -> Result<Rc<ClassObject>> {
        Ok(self.descriptor(id)?.class_object())
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.classes.borrow().len())
            .field("symbols", &self.symbols)
            .finish()
    }
}
