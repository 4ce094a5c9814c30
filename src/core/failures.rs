//! # Error stream: per-unit failure reports.
//!
//! Workers report each failed unit as a [`UnitFailure`] through an internal
//! [`ErrorSink`]; the application reads them from the single [`ErrorStream`].
//! The stream is decoupled from the drain signal: draining does not wait for
//! failures to be read.
//!
//! ## Overflow
//! The channel is bounded ([`Config::error_capacity`](crate::Config)). What happens
//! when it is full is chosen explicitly with [`ErrorOverflow`]:
//! ```text
//! Drop  → try_send; on Full/Closed: warn! + publish ErrorDropped, move on
//! Wait  → send().await; the failing key's worker waits for the consumer
//! ```

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::ErrorOverflow;
use crate::error::UnitError;
use crate::events::{Bus, Event, EventKind};

/// A failed unit, as delivered on the [`ErrorStream`].
#[derive(Error, Debug)]
#[error("unit {key:?} failed: {error}")]
pub struct UnitFailure {
    /// Key of the failed unit.
    pub key: Arc<str>,
    /// Why it failed.
    #[source]
    pub error: UnitError,
}

/// Receiving half of the error stream.
///
/// Obtained once from [`Dispatcher::take_errors`](crate::Dispatcher::take_errors).
pub struct ErrorStream {
    rx: mpsc::Receiver<UnitFailure>,
}

impl ErrorStream {
    /// Receives the next failure.
    ///
    /// Returns `None` once the dispatcher and all of its workers are gone.
    pub async fn recv(&mut self) -> Option<UnitFailure> {
        self.rx.recv().await
    }

    /// Receives a failure if one is already buffered.
    pub fn try_recv(&mut self) -> Option<UnitFailure> {
        self.rx.try_recv().ok()
    }
}

/// Sending half, shared by all workers through the registry.
pub(crate) struct ErrorSink {
    tx: mpsc::Sender<UnitFailure>,
    overflow: ErrorOverflow,
    bus: Bus,
}

impl ErrorSink {
    pub fn new(capacity: usize, overflow: ErrorOverflow, bus: Bus) -> (Self, ErrorStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx, overflow, bus }, ErrorStream { rx })
    }

    /// Delivers one failure according to the overflow policy.
    pub async fn report(&self, failure: UnitFailure) {
        match self.overflow {
            ErrorOverflow::Drop => match self.tx.try_send(failure) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(f)) => self.dropped(&f, "full"),
                Err(mpsc::error::TrySendError::Closed(f)) => self.dropped(&f, "closed"),
            },
            ErrorOverflow::Wait => {
                if let Err(mpsc::error::SendError(f)) = self.tx.send(failure).await {
                    self.dropped(&f, "closed");
                }
            }
        }
    }

    fn dropped(&self, failure: &UnitFailure, reason: &'static str) {
        tracing::warn!(
            key = %failure.key,
            error = %failure.error,
            reason,
            "failure report dropped"
        );
        self.bus.publish(
            Event::new(EventKind::ErrorDropped)
                .with_key(Arc::clone(&failure.key))
                .with_reason(reason),
        );
    }
}
