//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that lets the
//! registry and every worker publish without blocking.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                   Receivers (any):
//!   Registry  ──┐
//!   Worker 1  ──┼──────► Bus ───────► subscriber listener ────► SubscriberSet
//!   Worker N  ──┤  (broadcast chan)   Dispatcher::subscribe() callers
//!   ErrorSink ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No history**: events are lost if there are no active receivers at send time;
//!   a receiver created after a `Drained` event never observes it.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events only.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_late_receiver_misses_past_events() {
        let bus = Bus::new(8);
        let mut early = bus.subscribe();
        bus.publish(Event::new(EventKind::Drained).with_generation(1));

        let mut late = bus.subscribe();
        bus.publish(Event::new(EventKind::WorkerSpawned).with_key("k"));

        assert_eq!(early.recv().await.map(|e| e.kind).ok(), Some(EventKind::Drained));
        assert_eq!(
            late.recv().await.map(|e| e.kind).ok(),
            Some(EventKind::WorkerSpawned)
        );
    }

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::Drained));
    }
}
