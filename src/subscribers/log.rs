//! # LogWriter: renders events as `tracing` records
//!
//! A minimal subscriber that forwards every [`Event`] to `tracing` with structured
//! fields. Install a `tracing` subscriber (e.g. `tracing_subscriber::fmt` with an
//! `EnvFilter`) to choose the level; lifecycle chatter is `debug`, executions are
//! `info`, failures `error`, overflow and drops `warn`.
//!
//! ## Example output (fmt layer)
//! ```text
//! DEBUG keyvisor: worker spawned key="make docs"
//!  INFO keyvisor: unit starting key="make docs" executed=1
//! ERROR keyvisor: unit failed key="make docs" executed=1 elapsed_ms=120 reason="process exited with status 2"
//! DEBUG keyvisor: drained key="make docs" generation=1
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let key = e.key.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::UnitQueued => {
                tracing::debug!(target: "keyvisor", key, pending = ?e.pending, "unit queued");
            }
            EventKind::WorkerSpawned => {
                tracing::debug!(target: "keyvisor", key, "worker spawned");
            }
            EventKind::UnitStarting => {
                tracing::info!(target: "keyvisor", key, executed = ?e.executed, "unit starting");
            }
            EventKind::UnitSucceeded => {
                tracing::info!(
                    target: "keyvisor",
                    key,
                    executed = ?e.executed,
                    elapsed_ms = ?e.elapsed_ms,
                    "unit succeeded"
                );
            }
            EventKind::UnitFailed => {
                tracing::error!(
                    target: "keyvisor",
                    key,
                    executed = ?e.executed,
                    elapsed_ms = ?e.elapsed_ms,
                    reason,
                    "unit failed"
                );
            }
            EventKind::ErrorDropped => {
                tracing::warn!(target: "keyvisor", key, reason, "failure report dropped");
            }
            EventKind::WorkerRetired => {
                tracing::debug!(target: "keyvisor", key, executed = ?e.executed, "worker retired");
            }
            EventKind::Drained => {
                tracing::debug!(target: "keyvisor", key, generation = ?e.generation, "drained");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "keyvisor", subscriber = key, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(target: "keyvisor", subscriber = key, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
