//! Global entry points.
//!
//! Compiled code reaches static methods and constructors by name through
//! the symbol table. Bootstrap guards a class's aliases with a trampoline:
//! the first call through any of them runs the class's static initializer,
//! then the guard is dropped so later calls go straight to the target.

use crate::ClassRegistry;
use core_types::{ClassId, Result, RuntimeError, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Implementation of a global entry point: `(registry, args)`.
pub type StaticFn = Rc<dyn Fn(&ClassRegistry, &[Value]) -> Result<Value>>;

#[derive(Default)]
struct Symbol {
    guard: Cell<Option<ClassId>>,
    target: RefCell<Option<StaticFn>>,
}

/// Name → entry point registry.
#[derive(Default)]
pub struct SymbolTable {
    entries: RefCell<HashMap<String, Rc<Symbol>>>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, name: &str) -> Rc<Symbol> {
        self.entries
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// Binds `name` to `target`. A trampoline already installed for the
    /// name stays in front of the new target.
    pub fn define(&self, name: &str, target: StaticFn) {
        *self.entry(name).target.borrow_mut() = Some(target);
    }

    /// Puts a static-initialization trampoline for `class` in front of `name`.
    pub fn install_trampoline(&self, name: &str, class: ClassId) {
        self.entry(name).guard.set(Some(class));
    }

    /// Whether `name` is known, with or without a target.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.borrow().contains_key(name)
    }

    /// Whether the next call through `name` still goes through a trampoline.
    pub fn is_trampoline(&self, name: &str) -> bool {
        self.entries
            .borrow()
            .get(name)
            .is_some_and(|s| s.guard.get().is_some())
    }

    /// Calls the entry point bound to `name`.
    ///
    /// # Errors
    ///
    /// `UnknownSymbol` when nothing is bound under `name`; any error raised
    /// by the static initializer or by the target itself.
    pub fn call(&self, registry: &ClassRegistry, name: &str, args: &[Value]) -> Result<Value> {
        let symbol = self
            .entries
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownSymbol(name.to_string()))?;

        if let Some(class) = symbol.guard.take() {
            trace!(symbol = name, %class, "trampoline hit, initializing class");
            registry.initialize(class)?;
        }

        let target = symbol
            .target
            .borrow()
            .clone()
            .ok_or_else(|| RuntimeError::UnknownSymbol(name.to_string()))?;
        target(registry, args)
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        let mut names: Vec<&String> = entries.keys().collect();
        names.sort();
        f.debug_struct("SymbolTable").field("names", &names).finish()
    }
}
