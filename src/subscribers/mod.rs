//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! the optional built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Registry / Worker ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet::emit
//!                                                                           ├─► [queue] ─► LogWriter
//!                                                                           └─► [queue] ─► custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
