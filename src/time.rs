//! Time abstraction for testability.
//!
//! This module provides a [`Clock`] trait that allows injecting mock clocks
//! in tests while using the real monotonic clock in production. The
//! transport executor uses it to measure the wall-clock duration of a call.

use std::time::Instant;

/// Abstraction over monotonic time for testability.
///
/// Implementations provide the current instant, allowing tests to inject
/// controlled values instead of relying on the actual clock.
///
/// # Example
///
/// ```
/// use ntlm_soap::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let start = clock.now();
/// assert!(clock.now() >= start);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Production clock using [`Instant::now()`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that advances by a fixed step every time it is read.
///
/// Two consecutive reads are exactly `step` apart, which makes measured
/// durations deterministic in tests.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct SteppingClock {
    origin: Instant,
    step: std::time::Duration,
    reads: std::sync::atomic::AtomicU32,
}

#[cfg(test)]
impl SteppingClock {
    pub(crate) fn new(step: std::time::Duration) -> Self {
        Self {
            origin: Instant::now(),
            step,
            reads: std::sync::atomic::AtomicU32::new(0),
        }
    }
}

#[cfg(test)]
impl Clock for SteppingClock {
    fn now(&self) -> Instant {
        let n = self
            .reads
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.origin + self.step * n
    }
}
