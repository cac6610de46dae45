//! Deferred task queue drained once per scheduling turn.
//!
//! Work that must run "after the current synchronous batch" is deferred
//! here instead of behind a timer. The host calls [`Scheduler::flush`] at the
//! end of each turn (after dispatching an event, after a batch of store
//! writes); headless tests call it explicitly.
//!
//! # Invariants
//!
//! 1. **FIFO**: tasks run in the order they were deferred.
//! 2. **Drain to empty**: tasks deferred while flushing run in the same
//!    flush, after the tasks already queued.
//! 3. **No re-entrant flush**: `flush` called from inside a task returns 0
//!    and leaves the queue to the outer flush.
//! 4. **No cancellation**: a deferred task always runs on the next flush.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Task never runs | Host never flushes | Queue grows; `pending()` reports it |
//! | Endless flush | A task re-defers itself unconditionally | `flush` does not return |

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

type Task = Box<dyn FnOnce()>;

thread_local! {
    static GLOBAL_SCHEDULER: Scheduler = Scheduler::new();
}

#[derive(Default)]
struct Queue {
    tasks: RefCell<VecDeque<Task>>,
    flushing: Cell<bool>,
    turns: Cell<u64>,
}

/// Single-threaded deferred task queue. Clones share the queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Rc<Queue>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .field("turns", &self.turns())
            .finish()
    }
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The thread's shared scheduler.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_SCHEDULER.with(Clone::clone)
    }

    /// Queue `task` for the next flush.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.queue.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Tasks waiting for the next flush.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.tasks.borrow().len()
    }

    /// Number of flushes that ran at least one task.
    #[must_use]
    pub fn turns(&self) -> u64 {
        self.queue.turns.get()
    }

    /// Run queued tasks until the queue is empty; returns how many ran.
    pub fn flush(&self) -> usize {
        if self.queue.flushing.replace(true) {
            return 0;
        }
        let mut ran = 0;
        loop {
            let next = self.queue.tasks.borrow_mut().pop_front();
            let Some(task) = next else { break };
            task();
            ran += 1;
        }
        self.queue.flushing.set(false);
        if ran > 0 {
            self.queue.turns.set(self.queue.turns.get() + 1);
            trace!(ran, turn = self.queue.turns.get(), "scheduler flushed");
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tasks_wait_for_flush() {
        let s = Scheduler::new();
        let hit = Rc::new(Cell::new(false));
        let h = Rc::clone(&hit);
        s.defer(move || h.set(true));
        assert_eq!(s.pending(), 1);
        assert!(!hit.get());
        assert_eq!(s.flush(), 1);
        assert!(hit.get());
        assert_eq!(s.pending(), 0);
        assert_eq!(s.flush(), 0);
        assert_eq!(s.turns(), 1);
    }

    #[test]
    fn tasks_deferred_during_flush_run_in_same_flush() {
        let s = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner = s.clone();
        let l1 = Rc::clone(&log);
        s.defer(move || {
            l1.borrow_mut().push(1);
            let l3 = Rc::clone(&l1);
            inner.defer(move || l3.borrow_mut().push(3));
        });
        let l2 = Rc::clone(&log);
        s.defer(move || l2.borrow_mut().push(2));
        assert_eq!(s.flush(), 3);
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
        assert_eq!(s.turns(), 1);
    }

    #[test]
    fn nested_flush_is_ignored() {
        let s = Scheduler::new();
        let inner = s.clone();
        let nested = Rc::new(Cell::new(usize::MAX));
        let n = Rc::clone(&nested);
        s.defer(move || n.set(inner.flush()));
        s.defer(|| {});
        assert_eq!(s.flush(), 2);
        assert_eq!(nested.get(), 0);
    }

    #[test]
    fn global_is_shared_per_thread() {
        let a = Scheduler::global();
        let b = Scheduler::global();
        a.defer(|| {});
        assert_eq!(b.pending(), a.pending());
        b.flush();
        assert_eq!(a.pending(), 0);
    }

    proptest! {
        #[test]
        fn flush_preserves_defer_order(ids in prop::collection::vec(0u32..1000, 0..40)) {
            let s = Scheduler::new();
            let log = Rc::new(RefCell::new(Vec::new()));
            for id in &ids {
                let l = Rc::clone(&log);
                let id = *id;
                s.defer(move || l.borrow_mut().push(id));
            }
            prop_assert_eq!(s.flush(), ids.len());
            prop_assert_eq!(&*log.borrow(), &ids);
        }
    }
}
