//! Helpers that create and start threads in one step.

use crate::thread::Thread;
use core_types::{Result, Value};
use std::rc::Rc;

/// Creates a thread running `body` and starts it with the default
/// completion callback.
pub fn spawn<B>(body: B) -> Result<Thread>
where
    B: FnMut(&Thread) -> Result<Value> + 'static,
{
    let thread = Thread::new(body);
    thread.start()?;
    Ok(thread)
}

/// Creates a thread running `body` and starts it, delivering its outcome
/// to `on_complete`.
///
/// # Errors
///
/// Start errors, or whatever `on_complete` returns if the thread finishes
/// before the first suspension.
pub fn start_thread<B, C>(body: B, on_complete: C) -> Result<Thread>
where
    B: FnMut(&Thread) -> Result<Value> + 'static,
    C: FnOnce(Result<Value>) -> Result<()> + 'static,
{
    let thread = Thread::new(body);
    thread.start_with(on_complete)?;
    Ok(thread)
}

/// Wraps `f` so that every call runs it on a fresh thread with the given
/// arguments.
///
/// # Examples
///
/// ```
/// use continuation::thread_starter;
/// use core_types::Value;
///
/// let start = thread_starter(|_, args| Ok(args[0].clone()));
/// let thread = start(vec![Value::Int(1)]).unwrap();
/// assert!(thread.is_completed());
/// ```
pub fn thread_starter<F>(f: F) -> impl Fn(Vec<Value>) -> Result<Thread>
where
    F: Fn(&Thread, &[Value]) -> Result<Value> + 'static,
{
    let f = Rc::new(f);
    move |args: Vec<Value>| {
        let f = f.clone();
        spawn(move |thread| f(thread, &args))
    }
}
