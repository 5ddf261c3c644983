//! Runtime error types.
//!
//! Two families share one enum: contract violations, which mean the code
//! that emitted calls into the runtime is defective and are never retried,
//! and `Thrown`, a fault raised by compiled code itself.

use crate::ClassId;
use std::fmt;
use thiserror::Error;

/// Result type used across the runtime crates.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// An exception raised by compiled code.
///
/// # Examples
///
/// ```
/// use core_types::{Exception, RuntimeError};
///
/// let err = RuntimeError::from(Exception::new("java.lang.IllegalStateException", "boom"));
/// assert_eq!(err.to_string(), "java.lang.IllegalStateException: boom");
/// assert!(!err.is_contract_violation());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    /// Qualified name of the exception class
    pub class_name: String,
    /// Human-readable message
    pub message: String,
}

impl Exception {
    /// Creates an exception of the given class.
    pub fn new(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.class_name)
        } else {
            write!(f, "{}: {}", self.class_name, self.message)
        }
    }
}

/// Errors signaled by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// `start` called on a thread that is not `NotStarted`
    #[error("thread already started")]
    AlreadyStarted,

    /// Another thread is currently running
    #[error("another thread is running")]
    ContextAlreadyActive,

    /// `resume` called on a thread that is not suspended
    #[error("thread is not suspended (status: {status})")]
    NotSuspended {
        /// Status observed at the time of the call
        status: &'static str,
    },

    /// A thread operation needs an active thread and there is none
    #[error("no thread is running")]
    NoActiveContext,

    /// `pop` on an empty operand stack
    #[error("operand stack underflow")]
    StackUnderflow,

    /// A resumed body returned without reaching its suspension point
    #[error("invalid recorded state")]
    InvalidRecordedState,

    /// String table lookup out of range
    #[error("interned string index {index} out of range (table size {len})")]
    InternIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Size of the table
        len: usize,
    },

    /// A descriptor table slot has the wrong shape
    #[error("malformed descriptor table: class group {group}, field {field}: expected {expected}")]
    MalformedDescriptorTable {
        /// Index of the eight-slot group
        group: usize,
        /// Field name within the group
        field: &'static str,
        /// What the field should have held
        expected: &'static str,
    },

    /// Class id not known to the registry
    #[error("unknown class {0}")]
    UnknownClass(ClassId),

    /// Metadata attached twice to the same class
    #[error("class {0} already loaded")]
    ClassAlreadyLoaded(ClassId),

    /// A class reaches itself through its superclass or supertype links
    #[error("class {0} is its own ancestor")]
    CyclicHierarchy(ClassId),

    /// Class has no metadata yet
    #[error("class {0} not loaded")]
    ClassNotLoaded(ClassId),

    /// Global entry point not registered
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),

    /// Virtual call on a receiver whose class chain has no such selector
    #[error("method `{selector}` not found on class {class}")]
    MethodNotFound {
        /// Receiver class
        class: ClassId,
        /// Selector that failed to resolve
        selector: String,
    },

    /// Virtual call on a value that is not an object
    #[error("cannot dispatch on {0} value")]
    NotAnObject(&'static str),

    /// Exception raised by compiled code
    #[error("{0}")]
    Thrown(Exception),
}

impl RuntimeError {
    /// True for errors that indicate a defect in the calling code rather
    /// than an exception raised by the compiled program.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, RuntimeError::Thrown(_))
    }

    /// Shorthand for `RuntimeError::Thrown(Exception::new(..))`.
    pub fn thrown(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Thrown(Exception::new(class_name, message))
    }
}

impl From<Exception> for RuntimeError {
    fn from(exception: Exception) -> Self {
        RuntimeError::Thrown(exception)
    }
}
