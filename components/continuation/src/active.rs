//! The active-thread slot.
//!
//! At most one thread runs at a time. The slot is thread-local: each host
//! thread is an independent runtime with its own slot.

use crate::thread::{ResumeTrigger, Thread};
use core_types::{Result, RuntimeError};
use std::cell::RefCell;

thread_local! {
    static ACTIVE: RefCell<Option<Thread>> = const { RefCell::new(None) };
}

/// Clears the slot when dropped, including on unwinding.
pub(crate) struct ActiveGuard {
    _private: (),
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        let previous = ACTIVE.with(|slot| slot.borrow_mut().take());
        drop(previous);
    }
}

/// Marks `thread` as the running thread until the guard is dropped.
pub(crate) fn enter(thread: &Thread) -> ActiveGuard {
    ACTIVE.with(|slot| *slot.borrow_mut() = Some(thread.clone()));
    ActiveGuard { _private: () }
}

/// The running thread, if any.
pub fn current_thread() -> Option<Thread> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

/// Whether any thread is running.
pub fn is_any_active() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

pub(crate) fn is_current(thread: &Thread) -> bool {
    ACTIVE.with(|slot| slot.borrow().as_ref().is_some_and(|t| t.same_thread(thread)))
}

/// Whether the running thread has requested suspension. Compiled code
/// checks this after every call that may suspend and unwinds if true.
pub fn is_suspending() -> bool {
    current_thread().is_some_and(|t| t.is_suspending())
}

/// Whether the running thread is replaying towards its suspension point.
pub fn is_resuming() -> bool {
    current_thread().is_some_and(|t| t.is_resuming())
}

/// Suspends the running thread. See [`Thread::suspend`].
///
/// # Errors
///
/// `NoActiveContext` when no thread is running.
pub fn suspend<F>(callback: F) -> Result<()>
where
    F: FnOnce(ResumeTrigger) + 'static,
{
    current_thread()
        .ok_or(RuntimeError::NoActiveContext)?
        .suspend(callback)
}
