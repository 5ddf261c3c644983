//! Cooperative threads with suspend/replay.
//!
//! A thread's body is re-invoked from the top on every resume. Before
//! returning after a suspension, the body saves whatever it needs on the
//! operand stack; on resume it pops that state back while
//! [`Thread::is_resuming`] is true, and the leaf that suspended calls
//! [`Thread::finish_resuming`] to switch back to normal execution.

use crate::active;
use crate::event_loop::EventLoop;
use crate::event_loop::Task;
use core_types::{Result, RuntimeError, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// A thread body. Called once by `start` and again by every `resume`.
pub type Body = Box<dyn FnMut(&Thread) -> Result<Value>>;

/// Receives the final outcome of a thread.
pub type CompletionCallback = Box<dyn FnOnce(Result<Value>) -> Result<()>>;

type SuspendCallback = Box<dyn FnOnce(ResumeTrigger)>;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a [`Thread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadStatus {
    /// Created, `start` not yet called
    NotStarted,
    /// Executing normally
    Running,
    /// Unwinding towards, or parked after, a suspension
    Suspended,
    /// Replaying towards the suspension point
    Resuming,
    /// Completion callback has fired
    Completed,
}

impl ThreadStatus {
    /// Name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ThreadStatus::NotStarted => "NotStarted",
            ThreadStatus::Running => "Running",
            ThreadStatus::Suspended => "Suspended",
            ThreadStatus::Resuming => "Resuming",
            ThreadStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of [`Thread::async_call`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    /// The operation completed; carries the value handed to the trigger.
    Ready(T),
    /// The thread suspended; the body must save its state and return.
    Suspended,
}

struct ThreadInner {
    id: u64,
    status: Cell<ThreadStatus>,
    stack: RefCell<Vec<Value>>,
    pending: RefCell<Option<SuspendCallback>>,
    on_complete: RefCell<Option<CompletionCallback>>,
    body: RefCell<Option<Body>>,
    attribute: RefCell<Option<Value>>,
}

/// Handle to one cooperative thread. Clones share the same thread.
///
/// # Examples
///
/// ```
/// use continuation::{Step, Thread};
/// use core_types::Value;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let parked = Rc::new(RefCell::new(None));
/// let slot = parked.clone();
/// let thread = Thread::new(move |t| {
///     let slot = slot.clone();
///     match t.async_call(move |trigger| *slot.borrow_mut() = Some(trigger))? {
///         Step::Ready(value) => Ok(value),
///         Step::Suspended => Ok(Value::Void),
///     }
/// });
///
/// thread.start().unwrap();
/// assert!(thread.is_suspending());
///
/// let trigger = parked.borrow_mut().take().unwrap();
/// trigger.resume_with(Value::Int(7)).unwrap();
/// assert!(thread.is_completed());
/// ```
#[derive(Clone)]
pub struct Thread(Rc<ThreadInner>);

impl Thread {
    /// Creates a thread that has not started yet.
    pub fn new<F>(body: F) -> Self
    where
        F: FnMut(&Thread) -> Result<Value> + 'static,
    {
        Thread(Rc::new(ThreadInner {
            id: NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed),
            status: Cell::new(ThreadStatus::NotStarted),
            stack: RefCell::new(Vec::new()),
            pending: RefCell::new(None),
            on_complete: RefCell::new(None),
            body: RefCell::new(Some(Box::new(body))),
            attribute: RefCell::new(None),
        }))
    }

    /// Process-unique id, for logs.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Current status.
    pub fn status(&self) -> ThreadStatus {
        self.0.status.get()
    }

    /// Whether both handles refer to the same thread.
    pub fn same_thread(&self, other: &Thread) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// True once suspension has been requested, until the next resume.
    pub fn is_suspending(&self) -> bool {
        self.status() == ThreadStatus::Suspended
    }

    /// True while the body replays towards its suspension point.
    pub fn is_resuming(&self) -> bool {
        self.status() == ThreadStatus::Resuming
    }

    /// True after the completion callback has fired.
    pub fn is_completed(&self) -> bool {
        self.status() == ThreadStatus::Completed
    }

    /// Whether this thread occupies the active slot.
    pub fn is_active(&self) -> bool {
        active::is_current(self)
    }

    /// Pushes a value onto the operand stack.
    pub fn push(&self, value: Value) {
        self.0.stack.borrow_mut().push(value);
    }

    /// Pushes several values, first to last.
    pub fn push_all<I>(&self, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.0.stack.borrow_mut().extend(values);
    }

    /// Pops the most recently pushed value.
    ///
    /// # Errors
    ///
    /// `StackUnderflow` on an empty stack.
    pub fn pop(&self) -> Result<Value> {
        self.0
            .stack
            .borrow_mut()
            .pop()
            .ok_or(RuntimeError::StackUnderflow)
    }

    /// The top of the operand stack without removing it.
    pub fn peek(&self) -> Option<Value> {
        self.0.stack.borrow().last().cloned()
    }

    /// Number of values on the operand stack.
    pub fn stack_depth(&self) -> usize {
        self.0.stack.borrow().len()
    }

    /// Starts the thread, returning errors from the body to the caller.
    /// Normal results are discarded.
    pub fn start(&self) -> Result<()> {
        self.start_with(|result| result.map(|_| ()))
    }

    /// Starts the thread with an explicit completion callback.
    ///
    /// # Errors
    ///
    /// - `AlreadyStarted` if the thread was started before
    /// - `ContextAlreadyActive` if another thread is running
    /// - whatever the completion callback returns
    pub fn start_with<F>(&self, on_complete: F) -> Result<()>
    where
        F: FnOnce(Result<Value>) -> Result<()> + 'static,
    {
        if self.status() != ThreadStatus::NotStarted {
            return Err(RuntimeError::AlreadyStarted);
        }
        if active::is_any_active() {
            return Err(RuntimeError::ContextAlreadyActive);
        }
        *self.0.on_complete.borrow_mut() = Some(Box::new(on_complete));
        self.0.status.set(ThreadStatus::Running);
        debug!(thread = self.id(), "thread started");
        self.run()
    }

    /// Re-enters a suspended thread. The body replays from the top with
    /// status `Resuming`.
    ///
    /// # Errors
    ///
    /// - `ContextAlreadyActive` if another thread is running
    /// - `NotSuspended` if the thread is in any other state
    /// - `InvalidRecordedState` if the body returns without reaching the
    ///   point where it suspended
    pub fn resume(&self) -> Result<()> {
        if active::is_any_active() {
            return Err(RuntimeError::ContextAlreadyActive);
        }
        let status = self.status();
        if status != ThreadStatus::Suspended {
            return Err(RuntimeError::NotSuspended {
                status: status.name(),
            });
        }
        self.0.status.set(ThreadStatus::Resuming);
        trace!(thread = self.id(), "thread resuming");
        self.run()
    }

    /// Requests suspension. `callback` is invoked exactly once, after the
    /// body has returned, with the trigger that resumes this thread.
    ///
    /// # Errors
    ///
    /// - `NoActiveContext` if this thread is not the running one
    /// - `InvalidRecordedState` if the thread is already suspending or is
    ///   still replaying
    pub fn suspend<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce(ResumeTrigger) + 'static,
    {
        if !self.is_active() {
            return Err(RuntimeError::NoActiveContext);
        }
        if self.status() != ThreadStatus::Running {
            return Err(RuntimeError::InvalidRecordedState);
        }
        *self.0.pending.borrow_mut() = Some(Box::new(callback));
        self.0.status.set(ThreadStatus::Suspended);
        trace!(thread = self.id(), depth = self.stack_depth(), "thread suspending");
        Ok(())
    }

    /// Called by the leaf that suspended once the replay reaches it.
    /// Switches back to `Running` and returns the value the trigger
    /// carried, if any.
    ///
    /// # Errors
    ///
    /// `InvalidRecordedState` if the thread is not resuming.
    pub fn finish_resuming(&self) -> Result<Option<Value>> {
        if self.status() != ThreadStatus::Resuming {
            return Err(RuntimeError::InvalidRecordedState);
        }
        self.0.status.set(ThreadStatus::Running);
        Ok(self.0.attribute.borrow_mut().take())
    }

    /// Leaf protocol for an asynchronous operation.
    ///
    /// On first execution suspends with `op` and returns
    /// [`Step::Suspended`]. On replay finishes resuming and returns the
    /// value handed to the trigger (`Void` when none was given).
    pub fn async_call<F>(&self, op: F) -> Result<Step<Value>>
    where
        F: FnOnce(ResumeTrigger) + 'static,
    {
        if self.is_resuming() {
            let value = self.finish_resuming()?.unwrap_or(Value::Void);
            return Ok(Step::Ready(value));
        }
        self.suspend(op)?;
        Ok(Step::Suspended)
    }

    fn run(&self) -> Result<()> {
        let mut body = self
            .0
            .body
            .borrow_mut()
            .take()
            .ok_or(RuntimeError::InvalidRecordedState)?;
        let outcome = {
            let _guard = active::enter(self);
            body(self)
        };
        *self.0.body.borrow_mut() = Some(body);

        let value = match outcome {
            Ok(value) => value,
            Err(err) => {
                let discarded = self.0.pending.borrow_mut().take();
                if discarded.is_some() {
                    debug!(thread = self.id(), "suspension discarded by error");
                }
                return self.complete(Err(err));
            }
        };

        let pending = self.0.pending.borrow_mut().take();
        if let Some(callback) = pending {
            callback(ResumeTrigger {
                thread: self.clone(),
            });
            return Ok(());
        }

        match self.status() {
            ThreadStatus::Running => self.complete(Ok(value)),
            status => {
                debug!(thread = self.id(), %status, "body returned before reaching its suspension point");
                self.finish();
                Err(RuntimeError::InvalidRecordedState)
            }
        }
    }

    fn complete(&self, result: Result<Value>) -> Result<()> {
        debug!(thread = self.id(), ok = result.is_ok(), "thread completed");
        let callback = self.finish();
        match callback {
            Some(callback) => callback(result),
            None => result.map(|_| ()),
        }
    }

    /// Marks the thread completed and releases its body, returning the
    /// completion callback.
    fn finish(&self) -> Option<CompletionCallback> {
        self.0.status.set(ThreadStatus::Completed);
        let body = self.0.body.borrow_mut().take();
        drop(body);
        self.0.attribute.borrow_mut().take();
        self.0.on_complete.borrow_mut().take()
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread")
            .field("id", &self.id())
            .field("status", &self.status())
            .field("stack_depth", &self.stack_depth())
            .finish()
    }
}

/// One-shot handle that resumes a suspended thread.
pub struct ResumeTrigger {
    thread: Thread,
}

impl ResumeTrigger {
    /// The thread this trigger resumes.
    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    /// Resumes the thread now.
    pub fn resume(self) -> Result<()> {
        self.thread.resume()
    }

    /// Resumes the thread, handing it `value`. The leaf that suspended
    /// receives it from `finish_resuming`.
    pub fn resume_with(self, value: Value) -> Result<()> {
        *self.thread.0.attribute.borrow_mut() = Some(value);
        self.thread.resume()
    }

    /// Resumes the thread from a task on `event_loop`.
    pub fn schedule(self, event_loop: &EventLoop) {
        event_loop.enqueue_task(Task::new(move || self.resume()));
    }

    /// Like [`schedule`](Self::schedule), handing the thread `value`.
    pub fn schedule_with(self, event_loop: &EventLoop, value: Value) {
        event_loop.enqueue_task(Task::new(move || self.resume_with(value)));
    }
}

impl fmt::Debug for ResumeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeTrigger")
            .field("thread", &self.thread.id())
            .finish()
    }
}
