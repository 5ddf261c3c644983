//! Unit tests for the platform crate
