//! Runtime core: registry, workers and signaling.
//!
//! The only public API from this module is [`Dispatcher`] (plus its builder and the
//! error stream types). Everything else is an implementation detail.
//!
//! Internal modules:
//! - [`registry`]: key → live queue map, submit / retire / unregister under one lock;
//! - [`queue`]: per-key FIFO with its own short-lived lock;
//! - [`worker`]: per-key execution loop, failure reporting, panic isolation;
//! - [`signal`]: generation-counted drain signal;
//! - [`failures`]: bounded error stream with an explicit overflow policy;
//! - [`dispatcher`], [`builder`]: public facade and its construction.

mod builder;
mod dispatcher;
mod failures;
mod queue;
mod registry;
mod signal;
mod worker;

pub use builder::DispatcherBuilder;
pub use dispatcher::Dispatcher;
pub use failures::{ErrorStream, UnitFailure};
