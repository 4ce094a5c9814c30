//! # Drain signal: generation-counted completion notification.
//!
//! Every transition of the registry from non-empty to empty bumps a drain
//! generation. Waiters choose the semantics they need:
//!
//! ```text
//! wait_idle()              level: resolves while the registry is empty
//!                          (immediately if nothing is in flight)
//! wait_drain_after(g)      edge: resolves once a drain with generation > g happened,
//!                          even if it happened before the call
//! ```
//!
//! Both are backed by one `tokio::sync::watch` channel, so no drain is ever missed
//! by a waiter that remembers the last generation it saw.
//!
//! `mark_busy` / `mark_drained` are only called under the registry lock, so the
//! state always agrees with the registry's emptiness.

use tokio::sync::watch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DrainState {
    generation: u64,
    idle: bool,
}

pub(crate) struct DrainSignal {
    tx: watch::Sender<DrainState>,
}

impl DrainSignal {
    /// Creates an idle signal at generation 0.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DrainState {
            generation: 0,
            idle: true,
        });
        Self { tx }
    }

    /// Registry went from empty to non-empty.
    pub fn mark_busy(&self) {
        self.tx.send_if_modified(|s| {
            let changed = s.idle;
            s.idle = false;
            changed
        });
    }

    /// Registry went from non-empty to empty. Returns the new generation.
    pub fn mark_drained(&self) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|s| {
            s.generation += 1;
            s.idle = true;
            generation = s.generation;
        });
        generation
    }

    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    pub fn is_idle(&self) -> bool {
        self.tx.borrow().idle
    }

    /// Waits until the registry is empty and returns the generation observed then.
    pub async fn wait_idle(&self) -> u64 {
        self.wait_for(|s| s.idle).await
    }

    /// Waits until a drain newer than `generation` has happened; returns its generation.
    pub async fn wait_drain_after(&self, generation: u64) -> u64 {
        self.wait_for(|s| s.generation > generation).await
    }

    async fn wait_for(&self, ready: impl FnMut(&DrainState) -> bool) -> u64 {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(ready).await {
            Ok(state) => state.generation,
            // Unreachable while `self` (and thus the sender) is alive.
            Err(_closed) => self.generation(),
        }
    }
}
