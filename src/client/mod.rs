//! SOAP client facade.
//!
//! [`SoapClient`] owns one endpoint configuration for its lifetime and
//! dispatches calls through a [`TransportExecutor`]. It is constructed once
//! per endpoint and reused across many calls.
//!
//! Construction follows one of two paths, recorded in
//! [`SoapClient::construction_path`]:
//!
//! - Anonymous: `Unconfigured → BaseClientConstructed → Ready`
//! - NTLM: `Unconfigured → ScopedOverrideInstalled → BaseClientConstructed
//!   → OverrideRestored → Ready`

mod builder;
mod error;


use std::sync::{Mutex, PoisonError};

use url::Url;

pub use builder::SoapClientBuilder;
pub use error::ClientError;

use crate::config::{ClientOptions, EndpointConfig, Protocol};
use crate::time::{Clock, SystemClock};
use crate::transport::{
    HttpClient, HttpResponse, ReqwestClient, TransportError, TransportExecutor,
};

/// Lifecycle states of client construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionState {
    /// Options accepted, nothing built yet.
    Unconfigured,
    /// The NTLM handler is installed for the configured scheme.
    ScopedOverrideInstalled,
    /// The underlying client exists and metadata (if enabled) was fetched.
    BaseClientConstructed,
    /// The previous scheme handler is back in place.
    OverrideRestored,
    /// The client accepts calls.
    Ready,
}

/// SOAP client for one endpoint.
///
/// # Type Parameters
///
/// - `H`: The HTTP engine (defaults to [`ReqwestClient`])
/// - `C`: The clock measuring wall time
#[derive(Debug)]
pub struct SoapClient<H = ReqwestClient, C = SystemClock> {
    endpoint: EndpointConfig,
    executor: TransportExecutor<H, C>,
    metadata: Option<Vec<u8>>,
    construction_path: Vec<ConstructionState>,
    last_request: Mutex<Option<String>>,
}

impl SoapClient {
    /// Creates a client with the default stack: a reqwest engine with the
    /// configured timeouts, call records sent to `tracing` and a private
    /// transport registry.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the options are invalid, the engine
    /// cannot be initialized or the construction sequence fails.
    pub async fn new(options: &ClientOptions) -> Result<Self, ClientError> {
        let endpoint = EndpointConfig::from_options(options)?;
        let http = ReqwestClient::configured(endpoint.timeouts()).map_err(ClientError::Engine)?;

        SoapClientBuilder::new(endpoint, http).build().await
    }
}

impl<H: HttpClient, C: Clock> SoapClient<H, C> {
    /// Posts `body` to the configured location as the SOAP action `action`.
    ///
    /// The raw response is returned whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if no response could be received.
    pub async fn call(&self, action: &str, body: &str) -> Result<HttpResponse, TransportError> {
        self.call_at(self.endpoint.location(), action, body).await
    }

    /// Posts `body` to `location` instead of the configured location.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if no response could be received.
    pub async fn call_at(
        &self,
        location: &Url,
        action: &str,
        body: &str,
    ) -> Result<HttpResponse, TransportError> {
        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(body.to_string());

        self.executor.execute(body, location, action).await
    }
}

impl<H, C> SoapClient<H, C> {
    /// The endpoint configuration.
    pub const fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// The protocol scheme.
    pub const fn protocol(&self) -> Protocol {
        self.endpoint.protocol()
    }

    /// Sets the protocol scheme; values other than `http`/`https` are ignored.
    pub fn set_protocol(&mut self, protocol: &str) {
        self.endpoint.set_protocol(protocol);
    }

    /// The raw metadata document fetched during construction, if any.
    pub fn metadata(&self) -> Option<&[u8]> {
        self.metadata.as_deref()
    }

    /// The states construction went through.
    pub fn construction_path(&self) -> &[ConstructionState] {
        &self.construction_path
    }

    /// The envelope of the most recent call.
    pub fn last_request(&self) -> Option<String> {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The transport executor.
    pub const fn executor(&self) -> &TransportExecutor<H, C> {
        &self.executor
    }
}
