//! Core value types and error handling for the AOT runtime.
//!
//! This crate provides the foundational types shared by every runtime
//! component: the value representation compiled code operates on, the heap
//! object shapes, and the error taxonomy.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of runtime values
//! - [`ClassId`] - Index of a class descriptor in the registry arena
//! - [`Instance`], [`ArrayObject`], [`ClassObject`] - Heap objects
//! - [`RuntimeError`] - Contract violations and thrown exceptions
//!
//! # Examples
//!
//! ```
//! use core_types::{RuntimeError, Value};
//!
//! let v = Value::Int(42);
//! assert_eq!(v.kind_name(), "int");
//!
//! let err = RuntimeError::thrown("java.lang.RuntimeException", "failed");
//! assert!(!err.is_contract_violation());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod object;
mod value;

pub use error::{Exception, Result, RuntimeError};
pub use object::{ArrayObject, ClassId, ClassObject, Instance};
pub use value::Value;
