use std::sync::{Arc, Weak};

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;

use crate::{
    config::Config,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

use super::{dispatcher::Dispatcher, failures::ErrorSink, registry::Registry};

/// Builder for constructing a [`Dispatcher`] with optional subscribers.
pub struct DispatcherBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (units queued/started/failed, drains, ...)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the dispatcher.
    ///
    /// Initializes the event bus, the error stream, the registry and, when
    /// subscribers were given, their workers plus the bus listener feeding them.
    ///
    /// Must be called from within a Tokio runtime. Its handle is captured, so the
    /// built dispatcher accepts submissions from any thread.
    pub fn build(self) -> Dispatcher {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let (errors, stream) = ErrorSink::new(
            self.cfg.error_capacity_clamped(),
            self.cfg.error_overflow,
            bus.clone(),
        );
        let registry = Registry::new(bus.clone(), errors, Handle::current());

        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        if !subs.is_empty() {
            spawn_subscriber_listener(&bus, Arc::downgrade(&subs));
        }

        Dispatcher::from_parts(self.cfg, bus, registry, subs, stream)
    }
}

/// Forwards bus events to the subscriber set until every dispatcher handle is gone.
fn spawn_subscriber_listener(bus: &Bus, subs: Weak<SubscriberSet>) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let ev = match rx.recv().await {
                Ok(ev) => ev,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            match subs.upgrade() {
                Some(set) => set.emit(&ev),
                None => break,
            }
        }
    });
}
