//! Observer backed by `tracing`.

use std::time::Duration;

use super::{CallLevel, CallObserver, CallRecord};

/// Target of the events emitted by [`TracingObserver`].
pub const CALL_TARGET: &str = "ntlm_soap::call";

/// Emits each record as a `tracing` event with the record as fields.
///
/// Debug-level records become `DEBUG` events, error-level records become
/// `ERROR` events. Durations are reported in milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CallObserver for TracingObserver {
    fn log(&self, level: CallLevel, message: &str, record: &CallRecord) {
        let total_ms = millis(record.total_time);
        let connect_ms = millis(record.connect_time);
        let wall_ms = millis(record.wall_time);

        match level {
            CallLevel::Debug => tracing::debug!(
                target: CALL_TARGET,
                action = %record.action,
                location = %record.location,
                http_status = record.http_status,
                total_ms,
                connect_ms,
                wall_ms,
                request = %record.request_body,
                response = %record.response_body,
                "{message}"
            ),
            CallLevel::Error => tracing::error!(
                target: CALL_TARGET,
                action = %record.action,
                location = %record.location,
                http_status = record.http_status,
                total_ms,
                connect_ms,
                wall_ms,
                request = %record.request_body,
                response = %record.response_body,
                "{message}"
            ),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
