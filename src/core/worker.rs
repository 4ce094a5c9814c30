//! # Worker: per-key execution loop.
//!
//! Drains one [`KeyQueue`] a unit at a time and retires when it finds the queue
//! empty. Exactly one worker is live per key, so units sharing a key never overlap
//! and run in submission order.
//!
//! ## Event flow
//! ```text
//! UnitStarting → [action] → UnitSucceeded
//!                         → UnitFailed → ErrorStream (or ErrorDropped)
//! ...
//! WorkerRetired, then Drained if it was the last worker (both from the registry,
//! under its lock)
//! ```
//!
//! ## Architecture
//! ```text
//! Registry::submit ──► handle.spawn(Worker::run())
//!
//! loop {
//!   ├─► queue.pop()                    (queue lock only)
//!   │     └─ None → registry.retire()  (map lock, then queue lock)
//!   │                 ├─ Resumed(unit) → run it
//!   │                 ├─ Unregistered  → break
//!   │                 └─ Err(corrupt)  → abort process
//!   └─► execute(unit)                  (no lock held)
//!         ├─ Ok            → publish UnitSucceeded
//!         ├─ Err(e)        → publish UnitFailed, report UnitFailure
//!         └─ panic         → caught, reported as UnitError::Panicked
//! }
//! ```
//!
//! ## Rules
//! - A failing or panicking unit never stops the worker and is never retried.
//! - The only fatal condition is registry corruption.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;

use crate::core::failures::UnitFailure;
use crate::core::queue::KeyQueue;
use crate::core::registry::{Registry, Retire};
use crate::error::{RuntimeError, UnitError};
use crate::events::{Event, EventKind};
use crate::units::RunnableUnit;

pub(crate) struct Worker {
    registry: Arc<Registry>,
    queue: Arc<KeyQueue>,
}

impl Worker {
    pub fn new(registry: Arc<Registry>, queue: Arc<KeyQueue>) -> Self {
        Self { registry, queue }
    }

    /// Runs until the queue is observed empty under the registry lock.
    pub async fn run(self) {
        let mut executed: u64 = 0;

        while let Some(unit) = self.next_unit(executed) {
            executed += 1;
            self.execute(unit, executed).await;
        }
    }

    fn next_unit(&self, executed: u64) -> Option<RunnableUnit> {
        if let Some(unit) = self.queue.pop() {
            return Some(unit);
        }
        match self.registry.retire(&self.queue, executed) {
            Ok(Retire::Resumed(unit)) => Some(unit),
            Ok(Retire::Unregistered) => None,
            Err(e) => fatal(e),
        }
    }

    async fn execute(&self, unit: RunnableUnit, executed: u64) {
        let key = unit.key_arc();
        let bus = self.registry.bus();
        bus.publish(
            Event::new(EventKind::UnitStarting)
                .with_key(Arc::clone(&key))
                .with_executed(executed),
        );

        let action = Arc::clone(unit.action());
        let started = Instant::now();
        let res = match AssertUnwindSafe(async move { action.run().await })
            .catch_unwind()
            .await
        {
            Ok(res) => res,
            Err(payload) => Err(UnitError::Panicked {
                info: panic_message(payload.as_ref()),
            }),
        };
        let elapsed = started.elapsed();

        match res {
            Ok(()) => {
                bus.publish(
                    Event::new(EventKind::UnitSucceeded)
                        .with_key(key)
                        .with_executed(executed)
                        .with_elapsed(elapsed),
                );
            }
            Err(error) => {
                tracing::error!(
                    key = %key,
                    error = %error,
                    "unit failed, reporting on error stream"
                );
                bus.publish(
                    Event::new(EventKind::UnitFailed)
                        .with_key(Arc::clone(&key))
                        .with_executed(executed)
                        .with_elapsed(elapsed)
                        .with_reason(error.to_string()),
                );
                self.registry
                    .errors()
                    .report(UnitFailure { key, error })
                    .await;
            }
        }
    }
}

/// Registry corruption means a unit may be lost; stop the whole process.
fn fatal(err: RuntimeError) -> ! {
    tracing::error!(label = err.as_label(), "{}", err.as_message());
    eprintln!("[keyvisor] fatal: {err}");
    std::process::abort()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_str_and_string() {
        let a: Box<dyn Any + Send> = Box::new("static");
        let b: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let c: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(a.as_ref()), "static");
        assert_eq!(panic_message(b.as_ref()), "owned");
        assert_eq!(panic_message(c.as_ref()), "non-string panic payload");
    }
}
