//! Application execution logic.
//!
//! Reads the envelope, builds the client and performs a single call.

use thiserror::Error;
use tokio::io::AsyncReadExt;

use ntlm_soap::client::{ClientError, SoapClientBuilder};
use ntlm_soap::config::{BodySource, RunConfig};
use ntlm_soap::transport::{HttpClient, ReqwestClient, TransportError};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to read the envelope.
    #[error("Failed to read request body from {source_name}: {source}")]
    ReadBody {
        /// Where the envelope was read from
        source_name: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to construct the client.
    #[error("Failed to construct client: {0}")]
    Client(#[from] ClientError),

    /// The call failed before a response was received.
    #[error("SOAP call failed: {0}")]
    Call(#[from] TransportError),
}

/// Status and raw body of the completed call.
#[derive(Debug)]
pub struct CallOutcome {
    pub status: http::StatusCode,
    pub body: Vec<u8>,
}

impl CallOutcome {
    /// True when the endpoint answered HTTP 200.
    pub fn is_ok(&self) -> bool {
        self.status == http::StatusCode::OK
    }
}

/// Runs one call with the production HTTP engine.
///
/// Excluded from coverage - requires network access.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: RunConfig) -> Result<CallOutcome, RunError> {
    let envelope = read_body(&config.body).await?;
    let http = ReqwestClient::configured(config.endpoint.timeouts()).map_err(ClientError::Engine)?;

    execute_with(config, http, &envelope).await
}

/// Runs one call through `http`.
async fn execute_with<H: HttpClient>(
    config: RunConfig,
    http: H,
    envelope: &str,
) -> Result<CallOutcome, RunError> {
    let client = SoapClientBuilder::new(config.endpoint, http).build().await?;
    let response = client.call(&config.action, envelope).await?;

    tracing::info!(
        action = %config.action,
        status = %response.status,
        bytes = response.body.len(),
        "Call completed"
    );

    Ok(CallOutcome {
        status: response.status,
        body: response.body,
    })
}

/// Reads the envelope from a file or stdin.
async fn read_body(source: &BodySource) -> Result<String, RunError> {
    let read_error = |source: std::io::Error, from: &BodySource| RunError::ReadBody {
        source_name: from.to_string(),
        source,
    };

    match source {
        BodySource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| read_error(e, source)),
        BodySource::Stdin => {
            let mut envelope = String::new();
            tokio::io::stdin()
                .read_to_string(&mut envelope)
                .await
                .map_err(|e| read_error(e, source))?;
            Ok(envelope)
        }
    }
}
