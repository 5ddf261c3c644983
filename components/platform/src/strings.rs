//! Interned string literals.
//!
//! Every literal of a compiled unit is interned once when the unit loads,
//! so two reads of the same table entry, or of equal literals anywhere,
//! yield the same allocation.

use core_types::{Result, RuntimeError};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::debug;

/// Canonical string instances, keyed by content.
#[derive(Debug, Default)]
pub struct StringPool {
    strings: RefCell<HashSet<Rc<str>>>,
}

impl StringPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical instance for `text`, adding it if absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform::StringPool;
    /// use std::rc::Rc;
    ///
    /// let pool = StringPool::new();
    /// let a = pool.intern("hello");
    /// let b = pool.intern(&String::from("hello"));
    /// assert!(Rc::ptr_eq(&a, &b));
    /// ```
    pub fn intern(&self, text: &str) -> Rc<str> {
        if let Some(existing) = self.strings.borrow().get(text) {
            return existing.clone();
        }
        let interned: Rc<str> = Rc::from(text);
        self.strings.borrow_mut().insert(interned.clone());
        interned
    }

    /// Number of distinct strings in the pool.
    pub fn len(&self) -> usize {
        self.strings.borrow().len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.borrow().is_empty()
    }
}

/// Index-addressed literal table of one compiled unit.
#[derive(Debug)]
pub struct StringTable {
    pool: Rc<StringPool>,
    entries: RefCell<Vec<Rc<str>>>,
}

impl StringTable {
    /// Creates an empty table interning through `pool`.
    pub fn new(pool: Rc<StringPool>) -> Self {
        Self {
            pool,
            entries: RefCell::new(Vec::new()),
        }
    }

    /// The pool entries are interned through.
    pub fn pool(&self) -> &Rc<StringPool> {
        &self.pool
    }

    /// Replaces the table with the interned forms of `literals`.
    pub fn populate<I, S>(&self, literals: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<Rc<str>> = literals
            .into_iter()
            .map(|literal| self.pool.intern(literal.as_ref()))
            .collect();
        debug!(count = entries.len(), "string table populated");
        *self.entries.borrow_mut() = entries;
    }

    /// The interned literal at `index`.
    ///
    /// # Errors
    ///
    /// `InternIndexOutOfRange` when `index` is past the end of the table.
    pub fn get(&self, index: usize) -> Result<Rc<str>> {
        let entries = self.entries.borrow();
        entries
            .get(index)
            .cloned()
            .ok_or(RuntimeError::InternIndexOutOfRange {
                index,
                len: entries.len(),
            })
    }

    /// Number of literals.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
