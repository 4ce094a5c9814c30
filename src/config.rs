//! # Dispatcher configuration.
//!
//! Provides [`Config`] centralized settings for the dispatcher runtime and
//! [`ErrorOverflow`], the explicit policy for a full error stream.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `error_capacity = 0` → clamped to 1

/// What a worker does when the error stream is full (or nobody holds the receiver).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorOverflow {
    /// Drop the failure report, log it at warn level and publish
    /// [`EventKind::ErrorDropped`](crate::EventKind::ErrorDropped).
    ///
    /// Workers never block on the error stream.
    #[default]
    Drop,

    /// Wait for capacity before moving on to the next unit.
    ///
    /// Applies backpressure to the failing key: its worker stalls until the
    /// consumer of [`ErrorStream`](crate::ErrorStream) reads. Other keys are unaffected.
    Wait,
}

/// Global configuration for the dispatcher runtime.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1)
/// - `error_capacity`: Buffered failure reports before `error_overflow` applies (min 1)
/// - `error_overflow`: Policy when the error stream is full
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe `Lagged`
    /// and skip older items.
    pub bus_capacity: usize,

    /// Capacity of the error stream.
    pub error_capacity: usize,

    /// Policy applied when the error stream has no free slot.
    pub error_overflow: ErrorOverflow,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns an error stream capacity clamped to a minimum of 1.
    #[inline]
    pub fn error_capacity_clamped(&self) -> usize {
        self.error_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `error_capacity = 1024`
    /// - `error_overflow = ErrorOverflow::Drop` (workers never block on reporting)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            error_capacity: 1024,
            error_overflow: ErrorOverflow::default(),
        }
    }
}
