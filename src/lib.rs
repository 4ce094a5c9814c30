//! # keyvisor
//!
//! **Keyvisor** is a keyed, serializing dispatcher for Rust.
//!
//! Submit runnable units (closures or external commands) under an identity key:
//! units sharing a key run one at a time in submission order, units with distinct
//! keys run fully in parallel, and no submitted unit is ever dropped or run twice.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ RunnableUnit │   │ RunnableUnit │   │ RunnableUnit │
//!     │  key = "a"   │   │  key = "a"   │   │  key = "b"   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher::submit (never fails, never waits)                    │
//! │  Registry: key → KeyQueue          (one mutex, O(1) work only)    │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        ▼                                              ▼
//!   ┌───────────────────────┐                    ┌───────────────────────┐
//!   │ Worker "a"            │                    │ Worker "b"            │
//!   │ queue: [u1, u2]       │                    │ queue: [u3]           │
//!   │ pop → run → pop → ... │                    │ pop → run → retire    │
//!   └──────┬────────────────┘                    └──────┬────────────────┘
//!          │ UnitFailure                                │ last worker retired
//!          ▼                                            ▼
//!     ErrorStream (bounded,                       DrainSignal (generation += 1)
//!     Drop | Wait on overflow)                    wait_idle() / wait_drain_after(g)
//! ```
//!
//! ### Worker lifecycle
//! ```text
//! submit(unit) with no live worker for key ──► KeyQueue[unit] + handle.spawn(Worker)
//!
//! loop {
//!   ├─► pop head (queue lock only)
//!   │     └─ empty → retire under registry lock:
//!   │                  ├─ unit raced in → run it
//!   │                  └─ still empty   → unregister, maybe Drained, exit
//!   ├─► publish UnitStarting
//!   ├─► run action (no lock held; panics caught)
//!   └─► Ok → UnitSucceeded | Err → UnitFailed + UnitFailure on ErrorStream
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Dispatch**      | Keyed serialization, parallelism across keys.                | [`Dispatcher`], [`DispatcherBuilder`]       |
//! | **Units**         | Closures or OS commands with derived or explicit keys.       | [`RunnableUnit`], [`ActionFn`], [`CommandAction`] |
//! | **Completion**    | Generation-counted drain signal.                             | [`Dispatcher::wait_idle`]                   |
//! | **Errors**        | Per-unit failure stream and typed runtime errors.            | [`ErrorStream`], [`UnitFailure`], [`UnitError`], [`RuntimeError`] |
//! | **Subscriber API**| Hook into runtime events (logging, metrics).                 | [`Subscribe`], [`Event`]                    |
//! | **Configuration** | Bus and error stream capacities, overflow policy.            | [`Config`], [`ErrorOverflow`]               |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use keyvisor::{CommandAction, Config, Dispatcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = Dispatcher::new(Config::default());
//!     let mut errors = dispatcher.take_errors().expect("first take");
//!
//!     // Same argv → same key → runs one after the other.
//!     dispatcher.submit(CommandAction::new("true").into());
//!     dispatcher.submit(CommandAction::new("true").into());
//!     // Different key → runs in parallel.
//!     dispatcher.submit(CommandAction::new("sh").args(["-c", "exit 1"]).into());
//!
//!     dispatcher.wait_idle().await;
//!     while let Some(failure) = errors.try_recv() {
//!         eprintln!("{failure}");
//!     }
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod subscribers;
mod units;

// ---- Public re-exports ----

pub use config::{Config, ErrorOverflow};
pub use crate::core::{Dispatcher, DispatcherBuilder, ErrorStream, UnitFailure};
pub use error::{RuntimeError, UnitError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use units::{
    Action, ActionFn, ActionRef, BoxActionFuture, CommandAction, RunnableUnit, derive_key,
};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
