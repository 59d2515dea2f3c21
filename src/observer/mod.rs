//! Per-call observation.
//!
//! Every SOAP call produces exactly one [`CallRecord`], handed to a
//! [`CallObserver`] together with a [`CallLevel`] and a short message.
//! [`TracingObserver`] forwards records to `tracing`; [`NoopObserver`]
//! discards them.

mod record;
mod subscriber;

#[cfg(test)]
mod record_tests;
#[cfg(test)]
mod subscriber_tests;
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use record::{CallRecord, RESPONSE_LOG_LIMIT, TRUNCATION_MARKER, truncate_for_log};
pub use subscriber::{CALL_TARGET, TracingObserver};

/// Severity of a call record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallLevel {
    /// The call returned HTTP 200.
    Debug,
    /// Any other status, or no response at all.
    Error,
}

impl CallLevel {
    /// Level for a call that ended with `http_status`.
    #[must_use]
    pub const fn for_status(http_status: u16) -> Self {
        if http_status == 200 {
            Self::Debug
        } else {
            Self::Error
        }
    }
}

/// Receives one record per SOAP call.
///
/// Implementations must be cheap and must not fail; they are invoked
/// inline on the calling task.
pub trait CallObserver: Send + Sync {
    /// Handles a call record.
    fn log(&self, level: CallLevel, message: &str, record: &CallRecord);
}

/// Observer that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CallObserver for NoopObserver {
    fn log(&self, _level: CallLevel, _message: &str, _record: &CallRecord) {}
}
