//! Unit tests for class_registry

mod dispatch_test;
