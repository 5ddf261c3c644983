//! Host-facing services for compiled programs.
//!
//! - [`console`] - Line-buffered character sinks for stdout and stderr
//! - [`strings`] - Interned string literal table

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod console;
pub mod strings;

pub use console::{CaptureWriter, CharacterSink, LineWriter, StdioWriter, Stream, TracingWriter};
pub use strings::{StringPool, StringTable};
