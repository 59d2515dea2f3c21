//! Error types for transport operations.

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes what went wrong without dictating recovery strategy.
/// Nothing in this crate retries automatically.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// TLS failures and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    ///
    /// The server did not respond within the configured timeout period.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    ///
    /// This typically indicates a configuration error rather than
    /// a transient failure.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The NTLM handshake could not be completed.
    #[error("NTLM handshake failed: {0}")]
    Ntlm(#[from] NtlmError),
}

/// Error type for NTLM message handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NtlmError {
    /// The challenge token was not valid base64.
    #[error("challenge is not valid base64: {0}")]
    InvalidBase64(String),

    /// The message is shorter than its fixed header.
    #[error("message too short: {len} bytes")]
    Truncated {
        /// Actual length of the message
        len: usize,
    },

    /// The message does not start with the `NTLMSSP\0` signature.
    #[error("missing NTLMSSP signature")]
    BadSignature,

    /// The message is not of the expected type.
    #[error("expected message type {expected}, got {actual}")]
    UnexpectedType {
        /// Expected message type
        expected: u32,
        /// Actual message type
        actual: u32,
    },

    /// A security buffer points outside the message.
    #[error("{field} buffer out of bounds")]
    BufferOutOfBounds {
        /// Name of the buffer field
        field: &'static str,
    },
}

/// Error type for a single SOAP call.
///
/// Non-200 HTTP statuses are not errors; only failures that prevent a
/// response from being received end up here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP exchange failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The SOAP action cannot be sent as a header value.
    #[error("Invalid SOAP action '{action}': {reason}")]
    InvalidAction {
        /// The rejected action
        action: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Error type for the scheme transport registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// An override is already active for this scheme.
    #[error("an override is already active for scheme '{scheme}'")]
    Conflict {
        /// The contested scheme
        scheme: String,
    },
}

impl From<RegistryError> for crate::config::ConfigError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::Conflict { scheme } => Self::OverrideConflict { scheme },
        }
    }
}
