//! The structured record emitted for each SOAP call.

use std::borrow::Cow;
use std::time::Duration;

/// Maximum number of characters of a response body kept in a record.
pub const RESPONSE_LOG_LIMIT: usize = 2000;

/// Appended to a response body that was cut at [`RESPONSE_LOG_LIMIT`].
pub const TRUNCATION_MARKER: &str = "...";

/// Structured description of one SOAP call.
///
/// Created once per call, handed to the observer and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// SOAP action as passed by the caller
    pub action: String,
    /// Endpoint the envelope was posted to
    pub location: String,
    /// HTTP status, or 0 if the transfer failed before a status arrived
    pub http_status: u16,
    /// Envelope as sent
    pub request_body: String,
    /// Response body, capped at [`RESPONSE_LOG_LIMIT`] characters
    pub response_body: String,
    /// Engine-reported total transfer time
    pub total_time: Duration,
    /// Engine-reported connect time
    pub connect_time: Duration,
    /// Wall-clock time measured around the whole exchange
    pub wall_time: Duration,
}

impl CallRecord {
    /// Creates a record for a call with no response yet.
    #[must_use]
    pub fn new(
        action: impl Into<String>,
        location: impl Into<String>,
        request_body: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            location: location.into(),
            http_status: 0,
            request_body: request_body.into(),
            response_body: String::new(),
            total_time: Duration::ZERO,
            connect_time: Duration::ZERO,
            wall_time: Duration::ZERO,
        }
    }

    /// Sets the status and the (truncated) response body.
    #[must_use]
    pub fn with_response(mut self, http_status: u16, body: &[u8]) -> Self {
        self.http_status = http_status;
        self.response_body = truncate_for_log(&String::from_utf8_lossy(body)).into_owned();
        self
    }

    /// Sets the engine timings.
    #[must_use]
    pub const fn with_engine_times(mut self, total_time: Duration, connect_time: Duration) -> Self {
        self.total_time = total_time;
        self.connect_time = connect_time;
        self
    }

    /// Sets the wall-clock duration.
    #[must_use]
    pub const fn with_wall_time(mut self, wall_time: Duration) -> Self {
        self.wall_time = wall_time;
        self
    }
}

/// Caps `body` at [`RESPONSE_LOG_LIMIT`] characters.
///
/// Bodies within the limit are returned verbatim. Longer bodies keep
/// exactly the first [`RESPONSE_LOG_LIMIT`] characters followed by
/// [`TRUNCATION_MARKER`].
#[must_use]
pub fn truncate_for_log(body: &str) -> Cow<'_, str> {
    match body.char_indices().nth(RESPONSE_LOG_LIMIT) {
        None => Cow::Borrowed(body),
        Some((cut, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &body[..cut])),
    }
}
