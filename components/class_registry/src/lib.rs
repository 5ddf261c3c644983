//! Class registry and load-time bootstrap for compiled programs.
//!
//! This crate reconstructs class identity, inheritance and virtual
//! dispatch from the descriptor tables a compiled unit carries:
//! - [`ClassRegistry`] - Arena of class descriptors linked by index
//! - [`bootstrap`] - Descriptor table decoding and class loading
//! - [`SymbolTable`] - Global entry points with static-init trampolines
//! - [`introspect`] - Display names for diagnostics
//!
//! # Examples
//!
//! ```
//! use class_registry::{ClassRegistry, ClassRecord};
//! use core_types::Value;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let registry = ClassRegistry::new();
//! let counter = registry.declare_class("Counter");
//!
//! let runs = Rc::new(Cell::new(0));
//! let seen = runs.clone();
//! registry.load_classes(vec![
//!     ClassRecord::new(counter, "demo.Counter")
//!         .with_static_init(move |_| { seen.set(seen.get() + 1); Ok(()) })
//!         .with_alias("Counter_get"),
//! ]).unwrap();
//! registry.symbols().define("Counter_get", Rc::new(|_, _| Ok(Value::Int(0))));
//!
//! registry.call_static("Counter_get", &[]).unwrap();
//! registry.call_static("Counter_get", &[]).unwrap();
//! assert_eq!(runs.get(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bootstrap;
pub mod descriptor;
pub mod introspect;
pub mod registry;
pub mod symbols;

pub use bootstrap::{decode, ClassRecord, MethodEntry, Slot, StaticInitSlot, SLOTS_PER_CLASS};
pub use descriptor::{ClassDescriptor, ClassFlags, ClassMeta, MethodFn, PrimitiveKind, StaticInit};
pub use introspect::{class_name_of, debug_repr, display_name};
pub use registry::{ClassRegistry, CLASS_CLASS_NAME, OBJECT_CLASS_NAME, STRING_CLASS_NAME};
pub use symbols::{StaticFn, SymbolTable};
