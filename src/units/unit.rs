//! # Runnable unit: an action plus the key it is serialized under.
//!
//! A [`RunnableUnit`] is immutable once built. Submitting it moves it into the key
//! queue of the worker responsible for its key.

use std::fmt;
use std::sync::Arc;

use crate::units::action::ActionRef;
use crate::units::key::derive_key;

/// One submitted piece of work.
///
/// ## Example
/// ```rust
/// use keyvisor::{ActionFn, RunnableUnit, UnitError};
///
/// let action = ActionFn::arc(["make", "docs"], || async { Ok::<_, UnitError>(()) });
///
/// let derived = RunnableUnit::new(action.clone());
/// assert_eq!(derived.key(), "make docs");
///
/// let explicit = RunnableUnit::keyed("docs", action);
/// assert_eq!(explicit.key(), "docs");
/// ```
#[derive(Clone)]
pub struct RunnableUnit {
    key: Arc<str>,
    action: ActionRef,
}

impl RunnableUnit {
    /// Creates a unit keyed by its action's identity (see [`derive_key`]).
    pub fn new(action: ActionRef) -> Self {
        let key = derive_key(action.identity());
        Self {
            key: key.into(),
            action,
        }
    }

    /// Creates a unit with an explicit key.
    ///
    /// An empty key falls back to the derived key, same as [`RunnableUnit::new`].
    pub fn keyed(key: impl Into<String>, action: ActionRef) -> Self {
        let key = key.into();
        if key.is_empty() {
            return Self::new(action);
        }
        Self {
            key: key.into(),
            action,
        }
    }

    /// Serialization key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Action to execute.
    pub fn action(&self) -> &ActionRef {
        &self.action
    }

    pub(crate) fn key_arc(&self) -> Arc<str> {
        Arc::clone(&self.key)
    }
}

impl fmt::Debug for RunnableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnableUnit")
            .field("key", &self.key)
            .field("identity", &self.action.identity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnitError;
    use crate::units::ActionFn;

    fn noop(identity: &[&str]) -> ActionRef {
        ActionFn::arc(identity.iter().copied(), || async { Ok::<_, UnitError>(()) })
    }

    #[test]
    fn test_empty_key_falls_back_to_identity() {
        let unit = RunnableUnit::keyed("", noop(&["git", "fetch"]));
        assert_eq!(unit.key(), "git fetch");
    }

    #[test]
    fn test_explicit_key_wins() {
        let unit = RunnableUnit::keyed("repo-a", noop(&["git", "fetch"]));
        assert_eq!(unit.key(), "repo-a");
    }

    #[test]
    fn test_debug_shows_key_and_identity() {
        let unit = RunnableUnit::new(noop(&["true"]));
        let dbg = format!("{unit:?}");
        assert!(dbg.contains("key: \"true\""), "{dbg}");
    }
}
