//! # Function-backed action (`ActionFn`)
//!
//! [`ActionFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per run.
//! Shared state between runs must be explicit (`Arc<...>` captured by the closure).
//!
//! ## Example
//! ```rust
//! use keyvisor::{Action, ActionFn, ActionRef, UnitError};
//!
//! let a: ActionRef = ActionFn::arc(["backup", "/srv"], || async {
//!     // do work...
//!     Ok::<_, UnitError>(())
//! });
//!
//! assert_eq!(a.identity(), ["backup", "/srv"]);
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::error::UnitError;
use crate::units::action::{Action, BoxActionFuture};

/// Function-backed action implementation.
#[derive(Debug)]
pub struct ActionFn<F> {
    identity: Vec<String>,
    f: F,
}

impl<F> ActionFn<F> {
    /// Creates a new function-backed action with the given identity parts.
    ///
    /// Prefer [`ActionFn::arc`] when you immediately need an [`ActionRef`](crate::ActionRef).
    pub fn new<I, S>(identity: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identity: identity.into_iter().map(Into::into).collect(),
            f,
        }
    }

    /// Creates the action and returns it as a shared handle.
    pub fn arc<I, S>(identity: I, f: F) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self::new(identity, f))
    }
}

impl<F, Fut> Action for ActionFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), UnitError>> + Send + 'static,
{
    fn identity(&self) -> &[String] {
        &self.identity
    }

    fn run(&self) -> BoxActionFuture {
        Box::pin((self.f)())
    }
}
