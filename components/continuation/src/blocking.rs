//! Blocking operations built on suspension.
//!
//! The host has no blocking primitives, so each of these suspends the
//! calling thread and arranges for the event loop to resume it. They follow
//! the [`Thread::async_call`] leaf protocol: call them again on replay to
//! receive the result.

use crate::event_loop::EventLoop;
use crate::event_loop::Task;
use crate::thread::{ResumeTrigger, Step, Thread};
use core_types::{Result, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::trace;

/// Suspends `thread` for `millis` of virtual time.
///
/// # Examples
///
/// ```
/// use continuation::{blocking, EventLoop, Step, Thread};
/// use core_types::Value;
/// use std::rc::Rc;
///
/// let event_loop = Rc::new(EventLoop::new());
/// let el = event_loop.clone();
/// let thread = Thread::new(move |t| match blocking::sleep(t, &el, 50)? {
///     Step::Ready(_) => Ok(Value::Int(1)),
///     Step::Suspended => Ok(Value::Void),
/// });
///
/// thread.start().unwrap();
/// event_loop.run_until_done().unwrap();
/// assert!(thread.is_completed());
/// assert_eq!(event_loop.now(), 50);
/// ```
pub fn sleep(thread: &Thread, event_loop: &Rc<EventLoop>, millis: u64) -> Result<Step<Value>> {
    let event_loop = event_loop.clone();
    thread.async_call(move |trigger| {
        trace!(thread = trigger.thread().id(), millis, "sleeping");
        event_loop.set_timeout(millis, Task::new(move || trigger.resume()));
    })
}

/// Suspends `thread` and resumes it from the back of the task queue.
pub fn yield_now(thread: &Thread, event_loop: &Rc<EventLoop>) -> Result<Step<Value>> {
    let event_loop = event_loop.clone();
    thread.async_call(move |trigger| trigger.schedule(&event_loop))
}

/// Threads parked until another thread wakes them, in arrival order.
///
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct WaitQueue {
    waiters: Rc<RefCell<VecDeque<ResumeTrigger>>>,
}

impl WaitQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks `thread` on this queue. On replay yields the value the waker
    /// passed, or `Void`.
    pub fn park(&self, thread: &Thread) -> Result<Step<Value>> {
        let waiters = self.waiters.clone();
        thread.async_call(move |trigger| waiters.borrow_mut().push_back(trigger))
    }

    /// Schedules the oldest waiter to resume. Returns false if none was
    /// parked.
    pub fn unpark_one(&self, event_loop: &EventLoop) -> bool {
        let next = self.waiters.borrow_mut().pop_front();
        match next {
            Some(trigger) => {
                trigger.schedule(event_loop);
                true
            }
            None => false,
        }
    }

    /// Like [`unpark_one`](Self::unpark_one), handing the waiter `value`.
    pub fn unpark_one_with(&self, event_loop: &EventLoop, value: Value) -> bool {
        let next = self.waiters.borrow_mut().pop_front();
        match next {
            Some(trigger) => {
                trigger.schedule_with(event_loop, value);
                true
            }
            None => false,
        }
    }

    /// Schedules every parked thread to resume, returning how many were
    /// woken.
    pub fn unpark_all(&self, event_loop: &EventLoop) -> usize {
        let waiters: Vec<ResumeTrigger> = self.waiters.borrow_mut().drain(..).collect();
        let count = waiters.len();
        for trigger in waiters {
            trigger.schedule(event_loop);
        }
        count
    }

    /// Number of parked threads.
    pub fn len(&self) -> usize {
        self.waiters.borrow().len()
    }

    /// Whether no thread is parked.
    pub fn is_empty(&self) -> bool {
        self.waiters.borrow().is_empty()
    }
}

impl std::fmt::Debug for WaitQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitQueue")
            .field("waiters", &self.len())
            .finish()
    }
}
