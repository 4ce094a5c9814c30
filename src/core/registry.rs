//! # Registry - the single source of truth for "is a worker live for this key".
//!
//! Maps key → [`KeyQueue`] of the live worker. All structural mutations (insert,
//! remove, emptiness check) happen under one mutex that is held for O(1) map work
//! only, never across an action's execution or an `.await`.
//!
//! ## Architecture
//! ```text
//! submit(unit) ──► lock(map)
//!                    ├─ key absent  → KeyQueue::new(unit), WorkerSpawned,
//!                    │                handle.spawn(Worker), insert
//!                    └─ key present → queue.push(unit) + UnitQueued (queue lock nested)
//!
//! Worker: queue.pop() == None ──► retire(queue) ──► lock(map)
//!                                                     ├─ queue.pop() == Some → resume
//!                                                     └─ unregister: remove entry,
//!                                                        WorkerRetired, map empty →
//!                                                        DrainSignal + Drained
//! ```
//!
//! ## Rules
//! - Lock order is always **map → queue**; the worker never holds its queue lock
//!   while taking the map lock, so submit and retire cannot deadlock.
//! - Appends only happen under the map lock, so the emptiness re-check in
//!   `retire` is authoritative: no unit can land in a queue after its worker
//!   has been removed.
//! - Workers are spawned on the runtime handle captured at build time, so
//!   `submit` works from any thread. The worker is spawned before its entry is
//!   inserted; nothing fallible runs between the two.
//! - Registry events (`UnitQueued`, `WorkerSpawned`, `WorkerRetired`, `Drained`)
//!   are created and published while the lock that orders them is held, so for
//!   one key they precede or follow the worker's own events in causal order.
//! - Unregistering a non-empty or foreign queue is a [`RuntimeError`]; the
//!   worker treats it as fatal.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;

use crate::core::failures::ErrorSink;
use crate::core::queue::KeyQueue;
use crate::core::signal::DrainSignal;
use crate::core::worker::Worker;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::units::RunnableUnit;

type QueueMap = HashMap<Arc<str>, Arc<KeyQueue>>;

/// Outcome of a worker's attempt to retire.
pub(crate) enum Retire {
    /// A submission raced in; keep running with this unit.
    Resumed(RunnableUnit),
    /// Entry removed; the worker must stop.
    Unregistered,
}

pub(crate) struct Registry {
    queues: Mutex<QueueMap>,
    signal: DrainSignal,
    errors: ErrorSink,
    bus: Bus,
    runtime: Handle,
}

impl Registry {
    pub fn new(bus: Bus, errors: ErrorSink, runtime: Handle) -> Arc<Self> {
        Arc::new(Self {
            queues: Mutex::new(HashMap::new()),
            signal: DrainSignal::new(),
            errors,
            bus,
            runtime,
        })
    }

    /// Routes a unit to the live worker for its key, or spawns one.
    pub fn submit(self: &Arc<Self>, unit: RunnableUnit) {
        let key = unit.key_arc();
        let mut queues = self.lock();

        if let Some(queue) = queues.get(&key) {
            let pending = queue.push(unit, |pending| {
                self.bus.publish(
                    Event::new(EventKind::UnitQueued)
                        .with_key(Arc::clone(&key))
                        .with_pending(pending),
                );
            });
            drop(queues);

            tracing::debug!(key = %key, pending, "worker live for key, unit queued");
            return;
        }

        let queue = KeyQueue::new(Arc::clone(&key), unit);
        self.bus
            .publish(Event::new(EventKind::WorkerSpawned).with_key(Arc::clone(&key)));
        self.runtime
            .spawn(Worker::new(Arc::clone(self), Arc::clone(&queue)).run());
        if queues.is_empty() {
            self.signal.mark_busy();
        }
        queues.insert(Arc::clone(&key), queue);
        drop(queues);

        tracing::debug!(key = %key, "no worker for key, spawned one");
    }

    /// Worker exit path: resume with a raced-in unit, or unregister.
    ///
    /// On unregister, publishes `WorkerRetired` (with the worker's `executed`
    /// count) and then `Drained` if this emptied the registry.
    pub fn retire(
        &self,
        queue: &Arc<KeyQueue>,
        executed: u64,
    ) -> Result<Retire, RuntimeError> {
        let mut queues = self.lock();
        if let Some(unit) = queue.pop() {
            return Ok(Retire::Resumed(unit));
        }
        let drained = self.unregister_locked(&mut queues, queue)?;
        self.bus.publish(
            Event::new(EventKind::WorkerRetired)
                .with_key(queue.key_arc())
                .with_executed(executed),
        );
        if let Some(generation) = drained {
            self.publish_drained(queue.key(), generation);
        }
        drop(queues);

        tracing::debug!(
            key = queue.key(),
            executed,
            drained = ?drained,
            "queue empty, worker retired"
        );
        Ok(Retire::Unregistered)
    }

    /// Removes `queue`'s entry. Fails if the queue still holds units or is not the live entry.
    ///
    /// Returns the new drain generation if this emptied the registry.
    #[cfg(test)]
    pub fn unregister(&self, queue: &Arc<KeyQueue>) -> Result<Option<u64>, RuntimeError> {
        let mut queues = self.lock();
        let drained = self.unregister_locked(&mut queues, queue)?;
        if let Some(generation) = drained {
            self.publish_drained(queue.key(), generation);
        }
        Ok(drained)
    }

    fn unregister_locked(
        &self,
        queues: &mut QueueMap,
        queue: &Arc<KeyQueue>,
    ) -> Result<Option<u64>, RuntimeError> {
        let pending = queue.len();
        if pending != 0 {
            return Err(RuntimeError::RegistryCorrupted {
                key: queue.key().to_string(),
                pending,
            });
        }
        match queues.get(queue.key()) {
            Some(live) if Arc::ptr_eq(live, queue) => {
                queues.remove(queue.key());
            }
            _ => {
                return Err(RuntimeError::WorkerNotRegistered {
                    key: queue.key().to_string(),
                });
            }
        }

        if queues.is_empty() {
            Ok(Some(self.signal.mark_drained()))
        } else {
            Ok(None)
        }
    }

    fn publish_drained(&self, key: &str, generation: u64) {
        self.bus.publish(
            Event::new(EventKind::Drained)
                .with_key(key)
                .with_generation(generation),
        );
    }

    /// Returns sorted list of keys with a live worker.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().map(|k| k.to_string()).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of live workers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Units queued (not yet started) for `key`; `None` if no worker is live.
    pub fn pending(&self, key: &str) -> Option<usize> {
        self.lock().get(key).map(|q| q.len())
    }

    pub fn signal(&self) -> &DrainSignal {
        &self.signal
    }

    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    // Every mutation made under this lock is a single infallible map or deque
    // operation, so a poisoned guard still holds a consistent map.
    fn lock(&self) -> MutexGuard<'_, QueueMap> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorOverflow;
    use crate::error::UnitError;
    use crate::units::ActionFn;

    fn registry() -> Arc<Registry> {
        let bus = Bus::new(64);
        let (errors, _stream) = ErrorSink::new(8, ErrorOverflow::Drop, bus.clone());
        Registry::new(bus, errors, Handle::current())
    }

    fn unit(key: &str) -> RunnableUnit {
        RunnableUnit::keyed(key, ActionFn::arc([key], || async { Ok::<_, UnitError>(()) }))
    }

    /// Registers a queue without spawning a worker, as `submit` would.
    fn register(reg: &Registry, first: RunnableUnit) -> Arc<KeyQueue> {
        let queue = KeyQueue::new(first.key_arc(), first);
        let mut queues = reg.lock();
        if queues.is_empty() {
            reg.signal.mark_busy();
        }
        queues.insert(queue.key_arc(), Arc::clone(&queue));
        queue
    }

    #[tokio::test]
    async fn test_unregister_non_empty_queue_is_corruption() {
        let reg = registry();
        let queue = register(&reg, unit("k"));

        let err = reg.unregister(&queue).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::RegistryCorrupted {
                key: "k".into(),
                pending: 1
            }
        );
        assert_eq!(reg.keys(), vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn test_unregister_foreign_queue_is_corruption() {
        let reg = registry();
        let live = register(&reg, unit("k"));
        let stranger = KeyQueue::new("k".into(), unit("k"));
        stranger.pop();

        let err = reg.unregister(&stranger).unwrap_err();
        assert_eq!(err.as_label(), "worker_not_registered");
        assert_eq!(reg.pending("k"), Some(live.len()));
    }

    #[tokio::test]
    async fn test_retire_resumes_when_unit_raced_in() {
        let reg = registry();
        let queue = register(&reg, unit("k"));
        queue.pop();
        queue.push(unit("k"), |_| {});

        assert!(matches!(reg.retire(&queue, 1), Ok(Retire::Resumed(_))));
        assert_eq!(reg.len(), 1);
    }

    #[tokio::test]
    async fn test_last_retire_drains_registry() {
        let reg = registry();
        let a = register(&reg, unit("a"));
        let b = register(&reg, unit("b"));
        a.pop();
        b.pop();
        assert!(!reg.signal().is_idle());

        assert!(matches!(reg.retire(&a, 1), Ok(Retire::Unregistered)));
        assert!(!reg.signal().is_idle());
        assert_eq!(reg.keys(), vec!["b".to_string()]);

        assert!(matches!(reg.retire(&b, 1), Ok(Retire::Unregistered)));
        assert!(reg.signal().is_idle());
        assert_eq!(reg.signal().generation(), 1);
        assert!(reg.pending("a").is_none());
    }

    #[tokio::test]
    async fn test_retire_publishes_retired_before_drained() {
        let reg = registry();
        let mut events = reg.bus().subscribe();
        let queue = register(&reg, unit("k"));
        queue.pop();

        assert!(matches!(reg.retire(&queue, 3), Ok(Retire::Unregistered)));

        let retired = events.recv().await.unwrap();
        assert_eq!(retired.kind, EventKind::WorkerRetired);
        assert_eq!(retired.executed, Some(3));
        let drained = events.recv().await.unwrap();
        assert_eq!(drained.kind, EventKind::Drained);
        assert_eq!(drained.generation, Some(1));
        assert!(drained.seq > retired.seq);
    }

    #[test]
    fn test_submit_from_plain_thread_uses_captured_runtime() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let reg = rt.block_on(async { registry() });

        let r = Arc::clone(&reg);
        std::thread::spawn(move || r.submit(unit("k")))
            .join()
            .unwrap();

        let generation = rt.block_on(async {
            tokio::time::timeout(std::time::Duration::from_secs(1), reg.signal().wait_idle())
                .await
                .unwrap()
        });
        assert_eq!(generation, 1);
        assert!(reg.keys().is_empty());
    }
}
