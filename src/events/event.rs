//! # Runtime events emitted by the registry and workers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Submission events**: a unit was queued behind a live worker, or a worker was spawned
//! - **Execution events**: unit starting, succeeded, failed; failure report dropped
//! - **Lifecycle events**: worker retired, registry drained
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the key,
//! failure reasons, queue depth and drain generation.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically
//! in creation order. For one key, both `seq` and bus delivery order follow causal
//! order: `UnitQueued` is published before the worker can pop the unit,
//! `WorkerSpawned` before the worker starts, and `WorkerRetired` then `Drained`
//! while the registry lock is still held.
//!
//! ## Example
//! ```rust
//! use keyvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::UnitFailed)
//!     .with_key("rsync /data")
//!     .with_reason("process exited with status 23");
//!
//! assert_eq!(ev.kind, EventKind::UnitFailed);
//! assert_eq!(ev.key.as_deref(), Some("rsync /data"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `key`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `key`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Submission events ===
    /// A unit was appended behind a live worker.
    ///
    /// Sets:
    /// - `key`: unit key
    /// - `pending`: queue depth after the append
    UnitQueued,

    /// No worker existed for the key; one was registered and spawned.
    ///
    /// Sets:
    /// - `key`: unit key
    WorkerSpawned,

    // === Execution events ===
    /// A worker popped a unit and is about to run it.
    ///
    /// Sets:
    /// - `key`: unit key
    /// - `executed`: 1-based position of this unit in the worker's lifetime
    UnitStarting,

    /// The unit's action completed successfully.
    ///
    /// Sets:
    /// - `key`: unit key
    /// - `executed`: 1-based position of this unit in the worker's lifetime
    /// - `elapsed_ms`: wall-clock execution time
    UnitSucceeded,

    /// The unit's action failed (or panicked).
    ///
    /// Sets:
    /// - `key`: unit key
    /// - `executed`: 1-based position of this unit in the worker's lifetime
    /// - `elapsed_ms`: wall-clock execution time
    /// - `reason`: failure message
    UnitFailed,

    /// A failure report could not be delivered on the error stream.
    ///
    /// Sets:
    /// - `key`: unit key
    /// - `reason`: "full" or "closed"
    ErrorDropped,

    // === Lifecycle events ===
    /// A worker observed its queue empty and unregistered.
    ///
    /// Sets:
    /// - `key`: worker key
    /// - `executed`: total units run by this worker
    WorkerRetired,

    /// The registry transitioned from non-empty to empty.
    ///
    /// Sets:
    /// - `key`: key of the worker whose retirement emptied the registry
    /// - `generation`: drain generation (1-based, monotonic)
    Drained,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Key the event is about, if applicable.
    pub key: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Queue depth after a submission.
    pub pending: Option<u32>,
    /// Units run so far by the emitting worker.
    pub executed: Option<u64>,
    /// Execution time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Drain generation.
    pub generation: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            key: None,
            reason: None,
            pending: None,
            executed: None,
            elapsed_ms: None,
            generation: None,
        }
    }

    /// Attaches a key.
    #[inline]
    pub fn with_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a queue depth (saturates at `u32::MAX`).
    #[inline]
    pub fn with_pending(mut self, pending: usize) -> Self {
        self.pending = Some(u32::try_from(pending).unwrap_or(u32::MAX));
        self
    }

    /// Attaches the worker's executed-unit counter.
    #[inline]
    pub fn with_executed(mut self, n: u64) -> Self {
        self.executed = Some(n);
        self
    }

    /// Attaches an execution time (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// Attaches a drain generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_key(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_key(subscriber)
            .with_reason(info)
    }

    /// True for events produced by the subscriber machinery itself.
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::UnitQueued);
        let b = Event::new(EventKind::UnitQueued);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_fill_fields() {
        let ev = Event::new(EventKind::UnitSucceeded)
            .with_key("k")
            .with_executed(3)
            .with_elapsed(Duration::from_millis(1500))
            .with_pending(usize::MAX);
        assert_eq!(ev.key.as_deref(), Some("k"));
        assert_eq!(ev.executed, Some(3));
        assert_eq!(ev.elapsed_ms, Some(1500));
        assert_eq!(ev.pending, Some(u32::MAX));
        assert!(ev.reason.is_none());
        assert!(!ev.is_subscriber_event());
    }

    #[test]
    fn test_subscriber_helpers() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_event());
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }
}
