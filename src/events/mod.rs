//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the registry, workers and
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Registry` (queued, spawned, drained), `Worker` (starting,
//!   succeeded, failed, retired), `ErrorSink` (dropped reports), `SubscriberSet`
//!   workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by the dispatcher builder
//!   and any receiver obtained from `Dispatcher::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
