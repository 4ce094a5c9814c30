//! # Dispatcher: public facade over the registry, drain signal and error stream.
//!
//! The [`Dispatcher`] owns the event bus, the key registry and the
//! subscriber fan-out. It is cheap to clone; all clones share the same registry.
//!
//! ## High-level architecture
//! ```text
//! submit(unit) ──► Registry ──► Worker(key A) ──► action ──► UnitFailure ──► ErrorStream
//!                     │     └─► Worker(key B) ──► ...
//!                     │
//!                     └─► DrainSignal ◄── wait_idle() / wait_drain_after(g)
//!
//! Registry / Workers ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet
//!                                              └─► subscribe() receivers
//! ```
//!
//! ## Drain protocol
//! 1. stop submitting
//! 2. `wait_idle().await` (any number of times, by any number of callers)
//!
//! Work submitted while someone waits simply delays the next drain.
//!
//! ## Example
//! ```rust
//! use keyvisor::{ActionFn, Config, Dispatcher, RunnableUnit, UnitError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = Dispatcher::new(Config::default());
//!
//!     for i in 0..3 {
//!         let action = ActionFn::arc(["sync", "mirror"], move || async move {
//!             println!("sync #{i}");
//!             Ok::<(), UnitError>(())
//!         });
//!         dispatcher.submit(RunnableUnit::new(action));
//!     }
//!
//!     let generation = dispatcher.wait_idle().await;
//!     assert!(generation >= 1);
//!     assert!(dispatcher.active_keys().is_empty());
//! }
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;

use crate::config::Config;
use crate::core::builder::DispatcherBuilder;
use crate::core::failures::ErrorStream;
use crate::core::registry::Registry;
use crate::events::{Bus, Event};
use crate::subscribers::SubscriberSet;
use crate::units::RunnableUnit;

/// Keyed, serializing dispatcher.
///
/// At most one unit per key runs at a time; distinct keys run in parallel.
#[derive(Clone)]
pub struct Dispatcher {
    cfg: Config,
    bus: Bus,
    registry: Arc<Registry>,
    // The subscriber listener only holds a weak reference.
    subs: Arc<SubscriberSet>,
    errors: Arc<Mutex<Option<ErrorStream>>>,
}

impl Dispatcher {
    /// Creates a builder for a dispatcher with the given configuration.
    pub fn builder(cfg: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    /// Creates a dispatcher without subscribers.
    ///
    /// Must be called from within a Tokio runtime; workers are spawned on it.
    pub fn new(cfg: Config) -> Self {
        DispatcherBuilder::new(cfg).build()
    }

    pub(crate) fn from_parts(
        cfg: Config,
        bus: Bus,
        registry: Arc<Registry>,
        subs: Arc<SubscriberSet>,
        errors: ErrorStream,
    ) -> Self {
        Self {
            cfg,
            bus,
            registry,
            subs,
            errors: Arc::new(Mutex::new(Some(errors))),
        }
    }

    /// Submits a unit. Never fails and never waits for execution.
    ///
    /// If a worker is live for `unit.key()`, the unit is queued behind it;
    /// otherwise a worker is spawned on the runtime the dispatcher was built in.
    /// Callable from any thread, inside or outside that runtime.
    pub fn submit(&self, unit: RunnableUnit) {
        self.registry.submit(unit);
    }

    /// Waits until no worker is live and returns the drain generation observed.
    ///
    /// Returns immediately when nothing is in flight (generation `0` if nothing
    /// ever ran).
    pub async fn wait_idle(&self) -> u64 {
        self.registry.signal().wait_idle().await
    }

    /// Waits for a drain newer than `generation`, even one that already happened.
    pub async fn wait_drain_after(&self, generation: u64) -> u64 {
        self.registry.signal().wait_drain_after(generation).await
    }

    /// Number of completed drains so far.
    pub fn drain_generation(&self) -> u64 {
        self.registry.signal().generation()
    }

    /// True if no worker is live.
    pub fn is_idle(&self) -> bool {
        self.registry.signal().is_idle()
    }

    /// Sorted keys that currently have a live worker.
    pub fn active_keys(&self) -> Vec<String> {
        self.registry.keys()
    }

    /// Number of live workers.
    pub fn live_workers(&self) -> usize {
        self.registry.len()
    }

    /// Units waiting behind the running one for `key`; `None` if `key` is idle.
    pub fn pending(&self, key: &str) -> Option<usize> {
        self.registry.pending(key)
    }

    /// Takes the error stream. Only the first call returns `Some`.
    pub fn take_errors(&self) -> Option<ErrorStream> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// New receiver of runtime events (no history: only events published after this call).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Number of subscribers attached by the builder.
    pub fn subscriber_count(&self) -> usize {
        self.subs.len()
    }

    /// Configuration this dispatcher was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }
}
