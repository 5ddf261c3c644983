//! Unit tests for Thread suspend/replay

use continuation::{current_thread, EventLoop, ResumeTrigger, Step, Thread, ThreadStatus};
use core_types::{Result, RuntimeError, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Parked = Rc<RefCell<Option<ResumeTrigger>>>;

fn park_into(slot: &Parked) -> impl FnOnce(ResumeTrigger) + 'static {
    let slot = slot.clone();
    move |trigger| *slot.borrow_mut() = Some(trigger)
}

/// A thread that suspends once and parks its trigger in the returned slot.
fn suspending_thread() -> (Thread, Parked) {
    let parked: Parked = Rc::new(RefCell::new(None));
    let slot = parked.clone();
    let thread = Thread::new(move |t| match t.async_call(park_into(&slot))? {
        Step::Ready(value) => Ok(value),
        Step::Suspended => Ok(Value::Void),
    });
    (thread, parked)
}

fn take_trigger(parked: &Parked) -> ResumeTrigger {
    parked.borrow_mut().take().expect("thread did not suspend")
}

#[test]
fn stack_survives_suspend_and_resume() {
    let parked: Parked = Rc::new(RefCell::new(None));
    let restored = Rc::new(RefCell::new(vec![]));

    let slot = parked.clone();
    let seen = restored.clone();
    let thread = Thread::new(move |t| {
        if t.is_resuming() {
            // Restore in reverse of the save order.
            let c = t.pop()?;
            let b = t.pop()?;
            let a = t.pop()?;
            seen.borrow_mut().extend([a, b, c]);
        }
        match t.async_call(park_into(&slot))? {
            Step::Ready(_) => Ok(Value::Void),
            Step::Suspended => {
                t.push(Value::Int(1));
                t.push(Value::Long(2));
                t.push(Value::string("three"));
                Ok(Value::Void)
            }
        }
    });

    thread.start().unwrap();
    assert_eq!(thread.status(), ThreadStatus::Suspended);
    assert_eq!(thread.stack_depth(), 3);

    take_trigger(&parked).resume().unwrap();
    assert_eq!(
        *restored.borrow(),
        vec![Value::Int(1), Value::Long(2), Value::string("three")]
    );
    assert_eq!(thread.stack_depth(), 0);
    assert!(thread.is_completed());
}

#[test]
fn resume_with_hands_value_to_leaf() {
    let (thread, parked) = suspending_thread();
    let result = Rc::new(RefCell::new(None));
    let r = result.clone();
    thread
        .start_with(move |outcome| {
            *r.borrow_mut() = Some(outcome);
            Ok(())
        })
        .unwrap();
    assert!(result.borrow().is_none());

    take_trigger(&parked).resume_with(Value::Int(99)).unwrap();
    assert_eq!(*result.borrow(), Some(Ok(Value::Int(99))));
}

#[test]
fn double_start_fails() {
    let thread = Thread::new(|_| Ok(Value::Void));
    thread.start().unwrap();
    assert_eq!(thread.start(), Err(RuntimeError::AlreadyStarted));
}

#[test]
fn resume_not_started_fails() {
    let thread = Thread::new(|_| Ok(Value::Void));
    assert_eq!(
        thread.resume(),
        Err(RuntimeError::NotSuspended {
            status: "NotStarted"
        })
    );
    assert_eq!(thread.status(), ThreadStatus::NotStarted);
}

#[test]
fn resume_completed_fails() {
    let thread = Thread::new(|_| Ok(Value::Void));
    thread.start().unwrap();
    assert_eq!(
        thread.resume(),
        Err(RuntimeError::NotSuspended {
            status: "Completed"
        })
    );
}

#[test]
fn start_while_another_runs_fails_and_leaves_it_untouched() {
    let other = Thread::new(|_| Ok(Value::Void));
    let attempt = Rc::new(RefCell::new(None));

    let o = other.clone();
    let a = attempt.clone();
    let runner = Thread::new(move |_| {
        *a.borrow_mut() = Some(o.start());
        Ok(Value::Void)
    });
    runner.start().unwrap();

    assert_eq!(*attempt.borrow(), Some(Err(RuntimeError::ContextAlreadyActive)));
    assert_eq!(other.status(), ThreadStatus::NotStarted);
    other.start().unwrap();
    assert!(other.is_completed());
}

#[test]
fn resume_while_another_runs_fails_and_leaves_it_untouched() {
    let (sleeper, parked) = suspending_thread();
    sleeper.start().unwrap();

    let attempt = Rc::new(RefCell::new(None));
    let s = sleeper.clone();
    let a = attempt.clone();
    let runner = Thread::new(move |_| {
        *a.borrow_mut() = Some(s.resume());
        Ok(Value::Void)
    });
    runner.start().unwrap();

    assert_eq!(*attempt.borrow(), Some(Err(RuntimeError::ContextAlreadyActive)));
    assert_eq!(sleeper.status(), ThreadStatus::Suspended);
    take_trigger(&parked).resume().unwrap();
    assert!(sleeper.is_completed());
}

#[test]
fn error_is_delivered_to_completion_callback() {
    let delivered = Rc::new(RefCell::new(None));
    let d = delivered.clone();
    let thread = Thread::new(|_| Err(RuntimeError::thrown("java.lang.RuntimeException", "x")));
    thread
        .start_with(move |outcome| {
            *d.borrow_mut() = Some(outcome);
            Ok(())
        })
        .unwrap();
    assert_eq!(
        *delivered.borrow(),
        Some(Err(RuntimeError::thrown("java.lang.RuntimeException", "x")))
    );
    assert!(thread.is_completed());
}

#[test]
fn error_after_suspend_discards_the_suspension() {
    let suspended_callback_ran = Rc::new(Cell::new(false));
    let ran = suspended_callback_ran.clone();
    let thread = Thread::new(move |t| {
        let ran = ran.clone();
        t.suspend(move |_| ran.set(true))?;
        Err(RuntimeError::thrown("java.lang.Error", "after suspend"))
    });
    assert!(thread.start().is_err());
    assert!(!suspended_callback_ran.get());
    assert!(thread.is_completed());
}

#[test]
fn replay_that_misses_suspension_point_is_invalid() {
    let parked: Parked = Rc::new(RefCell::new(None));
    let slot = parked.clone();
    let thread = Thread::new(move |t| {
        if t.is_resuming() {
            // Never calls finish_resuming.
            return Ok(Value::Void);
        }
        t.suspend(park_into(&slot))?;
        Ok(Value::Void)
    });
    thread.start().unwrap();
    assert_eq!(
        take_trigger(&parked).resume(),
        Err(RuntimeError::InvalidRecordedState)
    );
    assert!(thread.is_completed());
}

#[test]
fn pop_on_empty_stack_fails_inside_body() {
    let thread = Thread::new(|t| t.pop());
    assert_eq!(thread.start(), Err(RuntimeError::StackUnderflow));
}

#[test]
fn active_slot_cleared_after_suspension() {
    let (thread, parked) = suspending_thread();
    thread.start().unwrap();
    assert!(current_thread().is_none());
    assert!(!thread.is_active());
    take_trigger(&parked).resume().unwrap();
    assert!(current_thread().is_none());
}

#[test]
fn free_functions_see_running_thread() {
    let observed = Rc::new(RefCell::new(vec![]));
    let o = observed.clone();
    let parked: Parked = Rc::new(RefCell::new(None));
    let slot = parked.clone();
    let thread = Thread::new(move |t| -> Result<Value> {
        o.borrow_mut()
            .push((continuation::is_suspending(), continuation::is_resuming()));
        if t.is_resuming() {
            t.finish_resuming()?;
            return Ok(Value::Void);
        }
        continuation::suspend(park_into(&slot))?;
        o.borrow_mut()
            .push((continuation::is_suspending(), continuation::is_resuming()));
        Ok(Value::Void)
    });
    thread.start().unwrap();
    take_trigger(&parked).resume().unwrap();
    assert_eq!(
        *observed.borrow(),
        vec![(false, false), (true, false), (false, true)]
    );
}

#[test]
fn suspension_callback_may_resume_synchronously() {
    let rounds = Rc::new(Cell::new(0));
    let r = rounds.clone();
    let thread = Thread::new(move |t| {
        r.set(r.get() + 1);
        match t.async_call(|trigger| {
            trigger.resume_with(Value::Int(5)).unwrap();
        })? {
            Step::Ready(value) => Ok(value),
            Step::Suspended => Ok(Value::Void),
        }
    });
    thread.start().unwrap();
    assert_eq!(rounds.get(), 2);
    assert!(thread.is_completed());
}

#[test]
fn scheduled_resume_runs_from_event_loop() {
    let event_loop = Rc::new(EventLoop::new());
    let el = event_loop.clone();
    let thread = Thread::new(move |t| {
        let el = el.clone();
        match t.async_call(move |trigger| trigger.schedule_with(&el, Value::Int(3)))? {
            Step::Ready(value) => Ok(value),
            Step::Suspended => Ok(Value::Void),
        }
    });
    thread.start().unwrap();
    assert!(thread.is_suspending());
    assert!(!event_loop.is_task_queue_empty());

    event_loop.run_until_done().unwrap();
    assert!(thread.is_completed());
}
