//! Unit tests for EventLoop

use continuation::{EventLoop, Task};
use core_types::RuntimeError;
use std::cell::RefCell;
use std::rc::Rc;

fn record(log: &Rc<RefCell<Vec<i32>>>, n: i32) -> impl FnOnce() -> Result<(), RuntimeError> {
    let log = log.clone();
    move || {
        log.borrow_mut().push(n);
        Ok(())
    }
}

#[test]
fn enqueue_task_adds_to_task_queue() {
    let event_loop = EventLoop::new();
    event_loop.enqueue_task(Task::new(|| Ok(())));
    assert!(!event_loop.is_task_queue_empty());
}

#[test]
fn task_queue_fifo_order() {
    let event_loop = EventLoop::new();
    let results = Rc::new(RefCell::new(vec![]));
    event_loop.enqueue_task(Task::new(record(&results, 1)));
    event_loop.enqueue_task(Task::new(record(&results, 2)));

    event_loop.run_until_done().unwrap();

    assert_eq!(*results.borrow(), vec![1, 2]);
}

#[test]
fn run_next_task_runs_exactly_one() {
    let event_loop = EventLoop::new();
    let results = Rc::new(RefCell::new(vec![]));
    event_loop.enqueue_task(Task::new(record(&results, 1)));
    event_loop.enqueue_task(Task::new(record(&results, 2)));

    assert_eq!(event_loop.run_next_task(), Ok(true));
    assert_eq!(*results.borrow(), vec![1]);
    assert!(!event_loop.is_task_queue_empty());

    assert_eq!(event_loop.run_next_task(), Ok(true));
    assert_eq!(event_loop.run_next_task(), Ok(false));
}

#[test]
fn task_enqueued_by_timer_runs_before_later_timer() {
    let event_loop = Rc::new(EventLoop::new());
    let results = Rc::new(RefCell::new(vec![]));

    let el = event_loop.clone();
    let r = results.clone();
    event_loop.set_timeout(
        10,
        Task::new(move || {
            r.borrow_mut().push(1);
            el.enqueue_task(Task::new(record(&r, 2)));
            Ok(())
        }),
    );
    event_loop.set_timeout(20, Task::new(record(&results, 3)));

    event_loop.run_until_done().unwrap();
    assert_eq!(*results.borrow(), vec![1, 2, 3]);
    assert_eq!(event_loop.now(), 20);
}

#[test]
fn timer_set_from_timer_is_relative_to_its_deadline() {
    let event_loop = Rc::new(EventLoop::new());
    let fired_at = Rc::new(RefCell::new(vec![]));

    let el = event_loop.clone();
    let f = fired_at.clone();
    event_loop.set_timeout(
        10,
        Task::new(move || {
            f.borrow_mut().push(el.now());
            let el2 = el.clone();
            let f2 = f.clone();
            el.set_timeout(
                5,
                Task::new(move || {
                    f2.borrow_mut().push(el2.now());
                    Ok(())
                }),
            );
            Ok(())
        }),
    );

    event_loop.run_until_done().unwrap();
    assert_eq!(*fired_at.borrow(), vec![10, 15]);
    assert_eq!(event_loop.pending_timers(), 0);
}

#[test]
fn fire_next_timer_reports_empty() {
    let event_loop = EventLoop::new();
    assert_eq!(event_loop.fire_next_timer(), Ok(false));
}

#[test]
fn timer_error_propagates() {
    let event_loop = EventLoop::new();
    event_loop.set_timeout(5, Task::new(|| Err(RuntimeError::NoActiveContext)));
    assert_eq!(event_loop.run_until_done(), Err(RuntimeError::NoActiveContext));
    assert_eq!(event_loop.now(), 5);
}
