//! Host event loop.
//!
//! This module provides the callback mechanism suspended threads are resumed
//! from. Each iteration (turn) of the loop takes the oldest task from the
//! task queue and executes it. When the queue is empty, the loop advances the
//! virtual clock to the earliest timer and runs that instead.
//!
//! The loop is shared behind `Rc` and every method takes `&self`: tasks run
//! with no queue borrowed, so they may enqueue more work.

use core_types::Result;
use std::cell::{Cell, RefCell};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use tracing::trace;

/// A task to be executed by the event loop.
///
/// Tasks represent host callbacks: timer expirations and resume triggers
/// handed back by suspended threads. Everything runs on the single host
/// thread, so callbacks need not be `Send`.
pub struct Task {
    callback: Box<dyn FnOnce() -> Result<()>>,
}

impl Task {
    /// Creates a new Task from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the task.
    pub fn run(self) -> Result<()> {
        (self.callback)()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task {{ ... }}")
    }
}

struct Timer {
    deadline: u64,
    seq: u64,
    task: Task,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        (self.deadline, self.seq) == (other.deadline, other.seq)
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline, self.seq).cmp(&(other.deadline, other.seq))
    }
}

/// The host event loop.
///
/// # Examples
///
/// ```
/// use continuation::{EventLoop, Task};
///
/// let event_loop = EventLoop::new();
///
/// event_loop.enqueue_task(Task::new(|| Ok(())));
/// event_loop.run_until_done().unwrap();
/// ```
#[derive(Default)]
pub struct EventLoop {
    tasks: RefCell<VecDeque<Task>>,
    timers: RefCell<BinaryHeap<Reverse<Timer>>>,
    now: Cell<u64>,
    next_seq: Cell<u64>,
}

impl EventLoop {
    /// Creates a new EventLoop with empty queues and the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the event loop until no task or timer is left.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all tasks completed successfully, or the first error a
    /// task returned. Work queued after the failing task stays queued.
    pub fn run_until_done(&self) -> Result<()> {
        loop {
            if !self.run_next_task()? && !self.fire_next_timer()? {
                return Ok(());
            }
        }
    }

    /// Adds a task to the task queue.
    ///
    /// The task will be executed in the next available iteration of the event loop.
    pub fn enqueue_task(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }

    /// Schedules `task` to run once the virtual clock reaches
    /// `now() + delay_ms`. Timers with the same deadline run in the order
    /// they were scheduled.
    pub fn set_timeout(&self, delay_ms: u64, task: Task) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        let deadline = self.now.get().saturating_add(delay_ms);
        trace!(deadline, seq, "timer scheduled");
        self.timers.borrow_mut().push(Reverse(Timer {
            deadline,
            seq,
            task,
        }));
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Number of timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Runs the oldest queued task. Returns false when the queue was empty.
    pub fn run_next_task(&self) -> Result<bool> {
        let next = self.tasks.borrow_mut().pop_front();
        match next {
            Some(task) => {
                task.run()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Advances the clock to the earliest timer and runs it. Returns false
    /// when no timer was pending.
    pub fn fire_next_timer(&self) -> Result<bool> {
        let next = self.timers.borrow_mut().pop();
        let Some(Reverse(timer)) = next else {
            return Ok(false);
        };
        if timer.deadline > self.now.get() {
            self.now.set(timer.deadline);
        }
        trace!(now = self.now.get(), seq = timer.seq, "timer fired");
        timer.task.run()?;
        Ok(true)
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("tasks", &self.tasks.borrow().len())
            .field("timers", &self.pending_timers())
            .field("now", &self.now.get())
            .finish()
    }
}
