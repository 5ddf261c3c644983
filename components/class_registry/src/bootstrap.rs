//! Loading classes from a compiled unit's descriptor table.
//!
//! The producer emits one flat table per unit, eight slots per class:
//!
//! | slot | content |
//! |------|---------|
//! | 0 | `Class(id)` |
//! | 1 | `Text(name)` |
//! | 2 | `Class(superclass)` or `Null` |
//! | 3 | `ClassList(declared supertypes)` |
//! | 4 | `Flags(bits)` |
//! | 5 | `Init(static initializer)` or `Null` |
//! | 6 | `Names(aliases)`, `Text(alias)` or `Null` |
//! | 7 | `Methods(dispatch entries)` |
//!
//! The whole table is decoded and checked before any class is touched, so
//! a malformed table leaves the registry unchanged.

use crate::descriptor::{ClassFlags, ClassMeta, MethodFn, StaticInit};
use crate::ClassRegistry;
use core_types::{ClassId, Result, RuntimeError};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Number of slots each class occupies in a descriptor table.
pub const SLOTS_PER_CLASS: usize = 8;

/// One dispatch table entry: one or more selectors sharing an implementation.
///
/// Several selectors appear when the compiler emits bridge methods, e.g. a
/// covariant override reachable under both return-type signatures.
pub struct MethodEntry {
    /// Selectors bound to the implementation
    pub selectors: Vec<String>,
    /// The implementation
    pub implementation: MethodFn,
}

impl MethodEntry {
    /// Entry bound to a single selector.
    pub fn new(selector: &str, implementation: MethodFn) -> Self {
        Self {
            selectors: vec![selector.to_string()],
            implementation,
        }
    }

    /// Entry bound to several selectors.
    pub fn aliased(selectors: &[&str], implementation: MethodFn) -> Self {
        Self {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            implementation,
        }
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("selectors", &self.selectors)
            .finish_non_exhaustive()
    }
}

/// A descriptor table slot.
pub enum Slot {
    /// Class reference
    Class(ClassId),
    /// A string: class name or single alias
    Text(String),
    /// Absent superclass, initializer or aliases
    Null,
    /// Declared supertypes
    ClassList(Vec<ClassId>),
    /// Flag bits
    Flags(u32),
    /// Static initializer
    Init(StaticInit),
    /// Alias names
    Names(Vec<String>),
    /// Dispatch entries
    Methods(Vec<MethodEntry>),
}

impl Slot {
    fn kind(&self) -> &'static str {
        match self {
            Slot::Class(_) => "Class",
            Slot::Text(_) => "Text",
            Slot::Null => "Null",
            Slot::ClassList(_) => "ClassList",
            Slot::Flags(_) => "Flags",
            Slot::Init(_) => "Init",
            Slot::Names(_) => "Names",
            Slot::Methods(_) => "Methods",
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Class(id) => f.debug_tuple("Class").field(id).finish(),
            Slot::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Slot::ClassList(ids) => f.debug_tuple("ClassList").field(ids).finish(),
            Slot::Flags(bits) => f.debug_tuple("Flags").field(bits).finish(),
            Slot::Names(names) => f.debug_tuple("Names").field(names).finish(),
            Slot::Methods(entries) => f.debug_tuple("Methods").field(entries).finish(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Typed form of one eight-slot group.
///
/// Producers that build tables in Rust can use this directly with
/// [`ClassRegistry::load_classes`] instead of raw slots.
#[derive(Debug)]
pub struct ClassRecord {
    /// Class being described
    pub class: ClassId,
    /// Qualified source name
    pub name: String,
    /// Direct superclass
    pub superclass: Option<ClassId>,
    /// Declared supertypes, without the direct superclass
    pub supertypes: Vec<ClassId>,
    /// Flag bits
    pub flags: ClassFlags,
    /// Static initializer
    pub static_init: Option<StaticInitSlot>,
    /// Global alias names
    pub aliases: Vec<String>,
    /// Dispatch entries, in table order
    pub methods: Vec<MethodEntry>,
}

/// Owned static initializer with a `Debug` impl, so records stay printable.
pub struct StaticInitSlot(pub StaticInit);

impl fmt::Debug for StaticInitSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StaticInit")
    }
}

impl ClassRecord {
    /// A root class with no flags, initializer, aliases or methods.
    pub fn new(class: ClassId, name: &str) -> Self {
        Self {
            class,
            name: name.to_string(),
            superclass: None,
            supertypes: Vec::new(),
            flags: ClassFlags::default(),
            static_init: None,
            aliases: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Sets the direct superclass.
    pub fn with_superclass(mut self, superclass: ClassId) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Sets the declared supertypes (interfaces).
    pub fn with_supertypes(mut self, supertypes: Vec<ClassId>) -> Self {
        self.supertypes = supertypes;
        self
    }

    /// Sets the flag bits.
    pub fn with_flags(mut self, flags: ClassFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the static initializer.
    pub fn with_static_init<F>(mut self, init: F) -> Self
    where
        F: FnOnce(&ClassRegistry) -> Result<()> + 'static,
    {
        self.static_init = Some(StaticInitSlot(Box::new(init)));
        self
    }

    /// Adds a global alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Appends a dispatch entry.
    pub fn with_method(mut self, entry: MethodEntry) -> Self {
        self.methods.push(entry);
        self
    }

    /// Encodes the record as its eight table slots.
    pub fn into_slots(self) -> [Slot; SLOTS_PER_CLASS] {
        [
            Slot::Class(self.class),
            Slot::Text(self.name),
            self.superclass.map_or(Slot::Null, Slot::Class),
            Slot::ClassList(self.supertypes),
            Slot::Flags(self.flags.bits()),
            self.static_init.map_or(Slot::Null, |init| Slot::Init(init.0)),
            Slot::Names(self.aliases),
            Slot::Methods(self.methods),
        ]
    }
}

fn malformed(group: usize, field: &'static str, expected: &'static str) -> RuntimeError {
    RuntimeError::MalformedDescriptorTable {
        group,
        field,
        expected,
    }
}

struct GroupReader<I> {
    slots: I,
    group: usize,
}

impl<I: Iterator<Item = Slot>> GroupReader<I> {
    fn next(&mut self, field: &'static str, expected: &'static str) -> Result<Slot> {
        self.slots
            .next()
            .ok_or_else(|| malformed(self.group, field, expected))
    }

    fn read(&mut self, first: Slot) -> Result<ClassRecord> {
        let group = self.group;
        let class = match first {
            Slot::Class(id) => id,
            _ => return Err(malformed(group, "class", "class reference")),
        };
        let name = match self.next("name", "text")? {
            Slot::Text(name) => name,
            _ => return Err(malformed(group, "name", "text")),
        };
        let superclass = match self.next("superclass", "class reference or null")? {
            Slot::Class(id) => Some(id),
            Slot::Null => None,
            _ => return Err(malformed(group, "superclass", "class reference or null")),
        };
        let supertypes = match self.next("supertypes", "class list")? {
            Slot::ClassList(ids) => ids,
            _ => return Err(malformed(group, "supertypes", "class list")),
        };
        let flags = match self.next("flags", "flag bits")? {
            Slot::Flags(bits) => ClassFlags::from_bits(bits),
            _ => return Err(malformed(group, "flags", "flag bits")),
        };
        let static_init = match self.next("static_init", "initializer or null")? {
            Slot::Init(init) => Some(StaticInitSlot(init)),
            Slot::Null => None,
            _ => return Err(malformed(group, "static_init", "initializer or null")),
        };
        let aliases = match self.next("aliases", "names, text or null")? {
            Slot::Names(names) => names,
            Slot::Text(name) => vec![name],
            Slot::Null => Vec::new(),
            _ => return Err(malformed(group, "aliases", "names, text or null")),
        };
        let methods = match self.next("methods", "dispatch entries")? {
            Slot::Methods(entries) => entries,
            _ => return Err(malformed(group, "methods", "dispatch entries")),
        };
        Ok(ClassRecord {
            class,
            name,
            superclass,
            supertypes,
            flags,
            static_init,
            aliases,
            methods,
        })
    }
}

/// Decodes a flat descriptor table into records without touching any
/// registry state.
///
/// # Errors
///
/// `MalformedDescriptorTable` when the table length is not a multiple of
/// [`SLOTS_PER_CLASS`] or a slot holds the wrong kind of value.
pub fn decode(table: Vec<Slot>) -> Result<Vec<ClassRecord>> {
    if table.len() % SLOTS_PER_CLASS != 0 {
        return Err(malformed(
            table.len() / SLOTS_PER_CLASS,
            "class",
            "eight slots per class",
        ));
    }
    let mut records = Vec::with_capacity(table.len() / SLOTS_PER_CLASS);
    let mut reader = GroupReader {
        slots: table.into_iter(),
        group: 0,
    };
    while let Some(first) = reader.slots.next() {
        records.push(reader.read(first)?);
        reader.group += 1;
    }
    Ok(records)
}

impl ClassRegistry {
    /// Loads every class described by a flat descriptor table.
    ///
    /// # Errors
    ///
    /// See [`decode`] and [`ClassRegistry::load_classes`]. On error no class
    /// from the table has been loaded.
    pub fn bootstrap(&self, table: Vec<Slot>) -> Result<()> {
        let records = decode(table)?;
        self.load_classes(records)
    }

    /// Loads classes from typed records.
    ///
    /// For each record: attaches metadata with the superclass appended to
    /// the declared supertypes; merges dispatch entries (later entries win
    /// for a repeated selector; ancestors are reached by chain walking so
    /// own entries override inherited ones); stores the static initializer;
    /// puts a trampoline in front of every alias.
    ///
    /// A declared supertype list that already contains the direct
    /// superclass yields a duplicate entry. Producers must not do that.
    ///
    /// # Errors
    ///
    /// `UnknownClass` for any id the registry never declared,
    /// `ClassAlreadyLoaded` for a class loaded before or twice in the batch,
    /// `CyclicHierarchy` when the batch would make a class its own ancestor.
    pub fn load_classes(&self, records: Vec<ClassRecord>) -> Result<()> {
        self.validate(&records)?;
        for record in records {
            self.load_one(record)?;
        }
        Ok(())
    }

    fn validate(&self, records: &[ClassRecord]) -> Result<()> {
        let mut seen = HashSet::new();
        for record in records {
            let desc = self.descriptor(record.class)?;
            if desc.is_loaded() || !seen.insert(record.class) {
                return Err(RuntimeError::ClassAlreadyLoaded(record.class));
            }
            for &id in record.superclass.iter().chain(&record.supertypes) {
                self.descriptor(id)?;
            }
        }

        let batch: HashMap<ClassId, Vec<ClassId>> = records
            .iter()
            .map(|r| (r.class, r.superclass.iter().chain(&r.supertypes).copied().collect()))
            .collect();
        let mut acyclic = HashSet::new();
        for record in records {
            self.check_ancestry(record.class, &batch, &mut HashSet::new(), &mut acyclic)?;
        }
        Ok(())
    }

    /// Depth-first walk over parent links. Parents come from the batch for
    /// classes in it and from loaded metadata for everything else.
    fn check_ancestry(
        &self,
        class: ClassId,
        batch: &HashMap<ClassId, Vec<ClassId>>,
        path: &mut HashSet<ClassId>,
        acyclic: &mut HashSet<ClassId>,
    ) -> Result<()> {
        if acyclic.contains(&class) {
            return Ok(());
        }
        if !path.insert(class) {
            return Err(RuntimeError::CyclicHierarchy(class));
        }
        let parents = match batch.get(&class) {
            Some(parents) => parents.clone(),
            None => self
                .descriptor(class)?
                .meta()
                .map(|meta| meta.supertypes.clone())
                .unwrap_or_default(),
        };
        for parent in parents {
            self.check_ancestry(parent, batch, path, acyclic)?;
        }
        path.remove(&class);
        acyclic.insert(class);
        Ok(())
    }

    fn load_one(&self, record: ClassRecord) -> Result<()> {
        let ClassRecord {
            class,
            name,
            superclass,
            mut supertypes,
            flags,
            static_init,
            aliases,
            methods,
        } = record;

        if let Some(superclass) = superclass {
            supertypes.push(superclass);
        }

        let mut dispatch = HashMap::new();
        for entry in methods {
            for selector in entry.selectors {
                dispatch.insert(selector, entry.implementation.clone());
            }
        }

        debug!(
            %class,
            name = %name,
            superclass = ?superclass,
            methods = dispatch.len(),
            aliases = aliases.len(),
            "loading class"
        );

        let meta = ClassMeta {
            binary_name: format!("L{};", name),
            name,
            superclass,
            supertypes,
            is_enum: flags.is_enum(),
            primitive: None,
            item: None,
            dispatch,
        };
        self.attach_meta(class, meta)?;
        self.descriptor(class)?
            .set_static_init(static_init.map(|init| init.0));

        for alias in &aliases {
            self.symbols().install_trampoline(alias, class);
        }
        Ok(())
    }
}
