//! Runtime facade for ahead-of-time compiled programs.
//!
//! Wires the class registry, the string table, the standard stream sinks
//! and the host event loop into one [`Runtime`], and ships a small
//! hand-compiled program used by the `aotrt-demo` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod demo;
pub mod runtime;

pub use cli::Cli;
pub use config::{ConsoleMode, RuntimeConfig};
pub use runtime::{CompiledUnit, Runtime};
