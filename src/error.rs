//! Error types used by the keyvisor runtime and by runnable units.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: invariant violations inside the dispatcher itself.
//! - [`UnitError`]: failures of individual runnable units.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors produced by the dispatcher runtime.
///
/// These are never expected at runtime: they mean the locking discipline between
/// submitters and workers was broken. A worker that observes one aborts the process.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A worker tried to unregister while its key queue still held units.
    ///
    /// This is the lost-wakeup case: a unit was appended after the worker decided to exit.
    #[error("registry corrupted: key {key:?} unregistered with {pending} pending unit(s)")]
    RegistryCorrupted {
        /// Key of the offending worker.
        key: String,
        /// Number of units left behind in its queue.
        pending: usize,
    },

    /// A worker tried to unregister a key whose registry entry belongs to another queue (or none).
    #[error("registry corrupted: key {key:?} is not owned by the retiring worker")]
    WorkerNotRegistered {
        /// Key of the offending worker.
        key: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use keyvisor::RuntimeError;
    ///
    /// let err = RuntimeError::RegistryCorrupted { key: "ls -la".into(), pending: 1 };
    /// assert_eq!(err.as_label(), "registry_corrupted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::RegistryCorrupted { .. } => "registry_corrupted",
            RuntimeError::WorkerNotRegistered { .. } => "worker_not_registered",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::RegistryCorrupted { key, pending } => {
                format!("non-empty queue at unregister; key={key} pending={pending}")
            }
            RuntimeError::WorkerNotRegistered { key } => {
                format!("retiring worker does not own registry entry; key={key}")
            }
        }
    }
}

/// # Errors produced by a runnable unit.
///
/// Reported on the error stream together with the unit's key. None of them stop
/// the worker: the next queued unit for the same key still runs.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UnitError {
    /// The action ran and reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The external process exited with a non-zero status code.
    #[error("process exited with status {code}")]
    Exit {
        /// Exit code reported by the operating system.
        code: i32,
    },

    /// The external process was terminated without an exit code (e.g. by a signal).
    #[error("process terminated without exit code")]
    Terminated,

    /// The external process could not be started.
    #[error("failed to spawn process: {error}")]
    Spawn {
        /// The underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// The action panicked; the panic was caught by the worker.
    #[error("action panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl UnitError {
    /// Shorthand for [`UnitError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        UnitError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use keyvisor::UnitError;
    ///
    /// assert_eq!(UnitError::Exit { code: 2 }.as_label(), "unit_exit_status");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            UnitError::Fail { .. } => "unit_failed",
            UnitError::Exit { .. } => "unit_exit_status",
            UnitError::Terminated => "unit_terminated",
            UnitError::Spawn { .. } => "unit_spawn_failed",
            UnitError::Panicked { .. } => "unit_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            UnitError::Fail { error } => format!("error: {error}"),
            UnitError::Exit { code } => format!("exit status: {code}"),
            UnitError::Terminated => "terminated by signal".to_string(),
            UnitError::Spawn { error } => format!("spawn: {error}"),
            UnitError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_runtime_error_display_names_key() {
        let err = RuntimeError::RegistryCorrupted {
            key: "make all".into(),
            pending: 2,
        };
        assert_eq!(
            err.to_string(),
            "registry corrupted: key \"make all\" unregistered with 2 pending unit(s)"
        );
        assert_eq!(err.as_message(), "non-empty queue at unregister; key=make all pending=2");
    }

    #[test]
    fn test_unit_error_labels_are_distinct() {
        let labels = [
            UnitError::fail("boom").as_label(),
            UnitError::Exit { code: 1 }.as_label(),
            UnitError::Terminated.as_label(),
            UnitError::Spawn {
                error: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
            .as_label(),
            UnitError::Panicked { info: "x".into() }.as_label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_spawn_error_keeps_source() {
        let err = UnitError::Spawn {
            error: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.source().is_some());
        assert!(UnitError::fail("x").source().is_none());
    }
}
