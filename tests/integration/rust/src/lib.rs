//! Integration test suite for the AOT runtime
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use aot_runtime;
    pub use class_registry;
    pub use continuation;
    pub use core_types;
    pub use platform;
}
