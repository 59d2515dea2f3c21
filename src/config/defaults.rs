//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Fixed user agent sent with every SOAP request.
pub const USER_AGENT: &str = concat!("ntlm-soap/", env!("CARGO_PKG_VERSION"));

/// Default connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default connect timeout as Duration.
#[must_use]
pub const fn connect_timeout() -> Duration {
    Duration::from_secs(CONNECT_TIMEOUT_SECS)
}

/// Default whole-request timeout as Duration.
#[must_use]
pub const fn request_timeout() -> Duration {
    Duration::from_secs(REQUEST_TIMEOUT_SECS)
}
