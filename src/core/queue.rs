//! # Key queue: FIFO of pending units for one key.
//!
//! Pushed by submitters (always while holding the registry lock), popped by the
//! queue's single worker. The inner mutex is only held for one push or pop, never
//! across the execution of an action.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::units::RunnableUnit;

/// Pending units sharing one key.
pub(crate) struct KeyQueue {
    key: Arc<str>,
    pending: Mutex<VecDeque<RunnableUnit>>,
}

impl KeyQueue {
    /// Creates a queue holding only `first`.
    pub fn new(key: Arc<str>, first: RunnableUnit) -> Arc<Self> {
        let mut pending = VecDeque::new();
        pending.push_back(first);
        Arc::new(Self {
            key,
            pending: Mutex::new(pending),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn key_arc(&self) -> Arc<str> {
        Arc::clone(&self.key)
    }

    /// Appends a unit and returns the queue depth after the append.
    ///
    /// `on_pushed` runs with the new depth before the lock is released, so the
    /// worker cannot pop the unit until it has returned.
    pub fn push(&self, unit: RunnableUnit, on_pushed: impl FnOnce(usize)) -> usize {
        let mut pending = self.lock();
        pending.push_back(unit);
        let depth = pending.len();
        on_pushed(depth);
        depth
    }

    /// Pops the oldest unit.
    pub fn pop(&self) -> Option<RunnableUnit> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // No code panics while holding this lock; a poisoned guard still holds a consistent deque.
    fn lock(&self) -> MutexGuard<'_, VecDeque<RunnableUnit>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnitError;
    use crate::units::ActionFn;

    fn unit(key: &str) -> RunnableUnit {
        RunnableUnit::keyed(key, ActionFn::arc([key], || async { Ok::<_, UnitError>(()) }))
    }

    #[test]
    fn test_fifo_order() {
        let first = unit("k");
        let q = KeyQueue::new(first.key_arc(), first);
        assert_eq!(q.push(unit("k"), |_| {}), 2);
        let mut seen = 0;
        assert_eq!(q.push(unit("k"), |depth| seen = depth), 3);
        assert_eq!(seen, 3);
        assert_eq!(q.len(), 3);

        let mut popped = 0;
        while q.pop().is_some() {
            popped += 1;
        }
        assert_eq!(popped, 3);
        assert_eq!(q.len(), 0);
        assert_eq!(q.key(), "k");
    }
}
