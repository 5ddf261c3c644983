//! Class descriptors: the per-class nodes of the registry arena.

use crate::ClassRegistry;
use core_types::{ClassId, ClassObject, Result, Value};
use std::cell::{Cell, OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Implementation of a virtual method: `(registry, receiver, args)`.
pub type MethodFn = Rc<dyn Fn(&ClassRegistry, &Value, &[Value]) -> Result<Value>>;

/// A class's static initializer. Runs at most once.
pub type StaticInit = Box<dyn FnOnce(&ClassRegistry) -> Result<()>>;

/// Flag bits carried in a descriptor table.
///
/// # Examples
///
/// ```
/// use class_registry::ClassFlags;
///
/// assert!(ClassFlags::from_bits(1).is_enum());
/// assert!(!ClassFlags::default().is_enum());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassFlags(u32);

impl ClassFlags {
    /// Bit 0: the class is an enum.
    pub const ENUM: u32 = 1;

    /// Wraps raw flag bits. Unknown bits are kept but ignored.
    pub const fn from_bits(bits: u32) -> Self {
        ClassFlags(bits)
    }

    /// The raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether the enum bit is set.
    pub const fn is_enum(self) -> bool {
        self.0 & Self::ENUM != 0
    }
}

/// The fixed set of primitive types. Their descriptors exist before any
/// class is bootstrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `char`
    Char,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `void`
    Void,
}

impl PrimitiveKind {
    /// All primitive kinds, in registry order.
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Char,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Void,
    ];

    /// Source-level name, e.g. `int`.
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Void => "void",
        }
    }

    /// One-letter binary name, e.g. `I`.
    pub const fn binary_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Z",
            PrimitiveKind::Byte => "B",
            PrimitiveKind::Short => "S",
            PrimitiveKind::Char => "C",
            PrimitiveKind::Int => "I",
            PrimitiveKind::Long => "J",
            PrimitiveKind::Float => "F",
            PrimitiveKind::Double => "D",
            PrimitiveKind::Void => "V",
        }
    }

    /// Zero value used to fill new arrays of this kind.
    pub fn default_value(self) -> Value {
        match self {
            PrimitiveKind::Boolean => Value::Boolean(false),
            PrimitiveKind::Byte => Value::Byte(0),
            PrimitiveKind::Short => Value::Short(0),
            PrimitiveKind::Char => Value::Char(0),
            PrimitiveKind::Int => Value::Int(0),
            PrimitiveKind::Long => Value::Long(0),
            PrimitiveKind::Float => Value::Float(0.0),
            PrimitiveKind::Double => Value::Double(0.0),
            PrimitiveKind::Void => Value::Void,
        }
    }

    /// The primitive kind of an unboxed value, if it has one.
    pub fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(_) => Some(PrimitiveKind::Boolean),
            Value::Byte(_) => Some(PrimitiveKind::Byte),
            Value::Short(_) => Some(PrimitiveKind::Short),
            Value::Char(_) => Some(PrimitiveKind::Char),
            Value::Int(_) => Some(PrimitiveKind::Int),
            Value::Long(_) => Some(PrimitiveKind::Long),
            Value::Float(_) => Some(PrimitiveKind::Float),
            Value::Double(_) => Some(PrimitiveKind::Double),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Metadata attached to a class when it is loaded.
pub struct ClassMeta {
    /// Qualified source name
    pub name: String,
    /// `L<name>;` for classes, the name itself for arrays
    pub binary_name: String,
    /// Direct superclass
    pub superclass: Option<ClassId>,
    /// Declared supertypes followed by the direct superclass
    pub supertypes: Vec<ClassId>,
    /// Enum flag
    pub is_enum: bool,
    /// Set only for the primitive singletons
    pub primitive: Option<PrimitiveKind>,
    /// Element class, set only for array classes
    pub item: Option<ClassId>,
    pub(crate) dispatch: HashMap<String, MethodFn>,
}

impl ClassMeta {
    /// Whether this is one of the primitive descriptors.
    pub fn is_primitive(&self) -> bool {
        self.primitive.is_some()
    }

    /// The class's own implementation of `selector`, ignoring ancestors.
    pub fn own_method(&self, selector: &str) -> Option<&MethodFn> {
        self.dispatch.get(selector)
    }

    /// Selectors declared directly on this class, sorted.
    pub fn selectors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dispatch.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ClassMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMeta")
            .field("name", &self.name)
            .field("binary_name", &self.binary_name)
            .field("superclass", &self.superclass)
            .field("supertypes", &self.supertypes)
            .field("is_enum", &self.is_enum)
            .field("primitive", &self.primitive)
            .field("item", &self.item)
            .field("dispatch", &self.selectors())
            .finish()
    }
}

/// One class node in the registry arena.
///
/// Declared first as a placeholder carrying only its raw name, then filled
/// exactly once by bootstrap. Array and primitive descriptors are created
/// with their metadata already attached.
pub struct ClassDescriptor {
    id: ClassId,
    raw_name: String,
    meta: OnceCell<ClassMeta>,
    static_init: RefCell<Option<StaticInit>>,
    array_class: Cell<Option<ClassId>>,
    class_object: OnceCell<Rc<ClassObject>>,
}

impl ClassDescriptor {
    pub(crate) fn new(id: ClassId, raw_name: String) -> Self {
        Self {
            id,
            raw_name,
            meta: OnceCell::new(),
            static_init: RefCell::new(None),
            array_class: Cell::new(None),
            class_object: OnceCell::new(),
        }
    }

    pub(crate) fn loaded(id: ClassId, raw_name: String, meta: ClassMeta) -> Self {
        Self {
            id,
            raw_name,
            meta: OnceCell::from(meta),
            static_init: RefCell::new(None),
            array_class: Cell::new(None),
            class_object: OnceCell::new(),
        }
    }

    /// Arena index of this descriptor.
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// The name the producer declared the class under.
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Metadata, once loaded.
    pub fn meta(&self) -> Option<&ClassMeta> {
        self.meta.get()
    }

    /// Whether bootstrap has attached metadata.
    pub fn is_loaded(&self) -> bool {
        self.meta.get().is_some()
    }

    /// Whether a static initializer is still waiting to run.
    pub fn has_pending_init(&self) -> bool {
        self.static_init.borrow().is_some()
    }

    pub(crate) fn attach(&self, meta: ClassMeta) -> std::result::Result<(), ClassMeta> {
        self.meta.set(meta)
    }

    pub(crate) fn set_static_init(&self, init: Option<StaticInit>) {
        *self.static_init.borrow_mut() = init;
    }

    /// Takes the initializer, leaving a no-op behind.
    pub(crate) fn take_static_init(&self) -> Option<StaticInit> {
        self.static_init.borrow_mut().take()
    }

    pub(crate) fn array_class(&self) -> Option<ClassId> {
        self.array_class.get()
    }

    pub(crate) fn set_array_class(&self, id: ClassId) {
        self.array_class.set(Some(id));
    }

    pub(crate) fn class_object(&self) -> Rc<ClassObject> {
        self.class_object
            .get_or_init(|| Rc::new(ClassObject::new(self.id)))
            .clone()
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("id", &self.id)
            .field("raw_name", &self.raw_name)
            .field("meta", &self.meta.get())
            .field("pending_init", &self.has_pending_init())
            .field("array_class", &self.array_class.get())
            .finish()
    }
}
