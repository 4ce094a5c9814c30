//! # Runnable units and actions.
//!
//! This module provides the work-side types:
//! - [`Action`] - trait for an opaque "run to completion" operation
//! - [`ActionFn`] - closure-backed action
//! - [`CommandAction`] - external process action
//! - [`RunnableUnit`] - an action bundled with its serialization key
//! - [`derive_key`] - default key from an action's identity

mod action;
mod action_fn;
mod command;
mod key;
mod unit;

pub use action::{Action, ActionRef, BoxActionFuture};
pub use action_fn::ActionFn;
pub use command::CommandAction;
pub use key::derive_key;
pub use unit::RunnableUnit;
