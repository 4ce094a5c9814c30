//! # Action abstraction.
//!
//! An [`Action`] is the opaque piece of work a worker executes: it exposes its
//! identity (used to derive a default key) and a single "run to completion"
//! operation. The dispatcher never looks inside it.
//!
//! The common handle type is [`ActionRef`], an `Arc<dyn Action>`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::UnitError;

/// Boxed future returned by [`Action::run`].
pub type BoxActionFuture = Pin<Box<dyn Future<Output = Result<(), UnitError>> + Send + 'static>>;

/// Shared handle to an action.
pub type ActionRef = Arc<dyn Action>;

/// # Opaque runnable action.
///
/// # Example
/// ```
/// use keyvisor::{Action, BoxActionFuture, UnitError};
///
/// struct Flush {
///     identity: Vec<String>,
/// }
///
/// impl Action for Flush {
///     fn identity(&self) -> &[String] {
///         &self.identity
///     }
///
///     fn run(&self) -> BoxActionFuture {
///         Box::pin(async { Ok::<(), UnitError>(()) })
///     }
/// }
/// ```
pub trait Action: Send + Sync + 'static {
    /// Identity parts of this invocation (for a process: program followed by its arguments).
    ///
    /// Used by [`derive_key`](crate::derive_key) when a unit is submitted without a key.
    fn identity(&self) -> &[String];

    /// Runs the action to completion.
    ///
    /// Called at most once per submitted unit, outside every dispatcher lock.
    fn run(&self) -> BoxActionFuture;
}
