//! Error types for client construction.

use thiserror::Error;
use url::Url;

use crate::config::ConfigError;
use crate::transport::HttpError;

/// Error type for [`SoapClient`](super::SoapClient) construction.
///
/// Construction either yields a ready client or fails; there is no
/// degraded mode.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The options are invalid or the scoped override could not be installed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP engine could not be initialized.
    #[error("Failed to initialize HTTP engine: {0}")]
    Engine(#[source] HttpError),

    /// The metadata request could not be completed.
    #[error("Failed to fetch service metadata from {url}: {source}")]
    Bootstrap {
        /// The metadata URL
        url: Url,
        /// The underlying transport failure
        #[source]
        source: HttpError,
    },

    /// The metadata request returned a non-success status.
    #[error("Service metadata request to {url} returned HTTP {status}")]
    Metadata {
        /// The metadata URL
        url: Url,
        /// The returned status code
        status: u16,
    },
}
