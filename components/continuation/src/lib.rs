//! Cooperative continuation engine for compiled code.
//!
//! The host has one logical thread of control and no blocking primitives.
//! Compiled code simulates blocking by suspending: it unwinds to the host
//! while saving its frames on an operand stack, and is later replayed from
//! the top, restoring those frames, once a host callback resumes it.
//!
//! # Overview
//!
//! - [`Thread`] - Suspend/replay state machine with an operand stack
//! - [`active`] - The slot naming the running thread
//! - [`EventLoop`] - Host driver: tasks and virtual-time timers
//! - [`blocking`] - Sleep, yield and wait queues built on suspension
//! - [`starter`] - One-step thread creation
//!
//! # Examples
//!
//! ```
//! use continuation::{EventLoop, Step, Thread};
//! use core_types::Value;
//! use std::rc::Rc;
//!
//! let event_loop = Rc::new(EventLoop::new());
//! let el = event_loop.clone();
//!
//! let thread = Thread::new(move |t| {
//!     // Restore the saved local when replaying.
//!     let counter = if t.is_resuming() { t.pop()? } else { Value::Int(41) };
//!     let el = el.clone();
//!     match t.async_call(move |trigger| trigger.schedule(&el))? {
//!         Step::Ready(_) => Ok(Value::Int(counter.as_int().unwrap_or(0) + 1)),
//!         Step::Suspended => {
//!             t.push(counter);
//!             Ok(Value::Void)
//!         }
//!     }
//! });
//!
//! thread.start().unwrap();
//! event_loop.run_until_done().unwrap();
//! assert!(thread.is_completed());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod active;
pub mod blocking;
pub mod event_loop;
pub mod starter;
pub mod thread;

// Re-export main types at crate root
pub use active::{current_thread, is_any_active, is_resuming, is_suspending, suspend};
pub use blocking::WaitQueue;
pub use event_loop::{EventLoop, Task};
pub use starter::{spawn, start_thread, thread_starter};
pub use thread::{Body, CompletionCallback, ResumeTrigger, Step, Thread, ThreadStatus};
