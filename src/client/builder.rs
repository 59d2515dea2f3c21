//! Client construction.
//!
//! Every construction holds the registry's construction lock while it
//! runs. Anonymous construction performs the optional metadata fetch
//! through the registry's current handler. NTLM construction installs a
//! scoped NTLM override for the configured scheme, performs the metadata
//! fetch under it and restores the previous handler before returning, on
//! success and on failure alike.

use std::sync::{Arc, Mutex};

use super::{ClientError, ConstructionState, SoapClient};
use crate::config::{ConfigError, Credentials, EndpointConfig};
use crate::config::defaults::USER_AGENT;
use crate::observer::{CallObserver, TracingObserver};
use crate::time::{Clock, SystemClock};
use crate::transport::{HttpClient, HttpRequest, TransportExecutor, TransportRegistry};

/// Builder for [`SoapClient`].
///
/// # Example
///
/// ```no_run
/// use ntlm_soap::client::SoapClientBuilder;
/// use ntlm_soap::config::{ClientOptions, EndpointConfig};
/// use ntlm_soap::transport::ReqwestClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ClientOptions::new("http://server/service.svc?wsdl")
///     .with_credentials("CORP\\alice", "secret");
/// let endpoint = EndpointConfig::from_options(&options)?;
/// let http = ReqwestClient::configured(endpoint.timeouts())?;
///
/// let client = SoapClientBuilder::new(endpoint, http).build().await?;
/// # Ok(())
/// # }
/// ```
pub struct SoapClientBuilder<H, C = SystemClock> {
    endpoint: EndpointConfig,
    http: H,
    clock: C,
    observer: Arc<dyn CallObserver>,
    registry: Option<Arc<TransportRegistry>>,
}

impl<H: HttpClient> SoapClientBuilder<H, SystemClock> {
    /// Creates a builder for `endpoint` sending through `http`.
    ///
    /// Records go to [`TracingObserver`] unless another observer is set.
    #[must_use]
    pub fn new(endpoint: EndpointConfig, http: H) -> Self {
        Self {
            endpoint,
            http,
            clock: SystemClock,
            observer: Arc::new(TracingObserver),
            registry: None,
        }
    }
}

impl<H: HttpClient, C: Clock> SoapClientBuilder<H, C> {
    /// Sets the observer receiving call records.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Uses a shared registry instead of a private one.
    ///
    /// Clients built against the same registry construct one at a time.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<TransportRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the clock used for wall-time measurement.
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> SoapClientBuilder<H, C2> {
        SoapClientBuilder {
            endpoint: self.endpoint,
            http: self.http,
            clock,
            observer: self.observer,
            registry: self.registry,
        }
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Config`] with [`ConfigError::OverrideConflict`] if
    ///   another override is active for the scheme
    /// - [`ClientError::Bootstrap`] if the metadata request fails
    /// - [`ClientError::Metadata`] if the metadata request returns a
    ///   non-success status
    pub async fn build(self) -> Result<SoapClient<H, C>, ClientError> {
        let registry = self.registry.unwrap_or_default();
        let executor = TransportExecutor::new(self.http)
            .with_credentials(self.endpoint.credentials().cloned())
            .with_observer(self.observer)
            .with_clock(self.clock);

        let mut path = vec![ConstructionState::Unconfigured];

        let metadata = match self.endpoint.credentials() {
            None => {
                // Another client's override must not apply to this fetch
                let _window = registry.lock_construction().await;
                let metadata = bootstrap(&self.endpoint, &registry, executor.http()).await?;
                path.push(ConstructionState::BaseClientConstructed);
                metadata
            }
            Some(credentials) => {
                construct_with_override(
                    &self.endpoint,
                    credentials,
                    &registry,
                    executor.http(),
                    &mut path,
                )
                .await?
            }
        };

        path.push(ConstructionState::Ready);
        tracing::debug!(
            endpoint = %self.endpoint,
            path = ?path,
            "SOAP client ready"
        );

        Ok(SoapClient {
            endpoint: self.endpoint,
            executor,
            metadata,
            construction_path: path,
            last_request: Mutex::new(None),
        })
    }
}

async fn construct_with_override<H: HttpClient>(
    endpoint: &EndpointConfig,
    credentials: &Credentials,
    registry: &TransportRegistry,
    http: &H,
    path: &mut Vec<ConstructionState>,
) -> Result<Option<Vec<u8>>, ClientError> {
    let _window = registry.lock_construction().await;
    let scheme = endpoint.protocol().as_str();

    let guard = registry
        .scoped_override(scheme, credentials.clone())
        .map_err(ConfigError::from)?;
    path.push(ConstructionState::ScopedOverrideInstalled);

    let fetched = bootstrap(endpoint, registry, http).await;
    if fetched.is_ok() {
        path.push(ConstructionState::BaseClientConstructed);
    }

    drop(guard);
    path.push(ConstructionState::OverrideRestored);

    fetched
}

/// Fetches the service metadata through the registry, if enabled.
async fn bootstrap<H: HttpClient>(
    endpoint: &EndpointConfig,
    registry: &TransportRegistry,
    http: &H,
) -> Result<Option<Vec<u8>>, ClientError> {
    if !endpoint.fetch_metadata() {
        return Ok(None);
    }

    let url = endpoint.url().clone();
    let request = HttpRequest::get(url.clone()).with_header(
        http::header::USER_AGENT,
        http::HeaderValue::from_static(USER_AGENT),
    );

    let response = registry
        .fetch(http, request)
        .await
        .map_err(|source| ClientError::Bootstrap {
            url: url.clone(),
            source,
        })?;

    if !response.is_success() {
        return Err(ClientError::Metadata {
            url,
            status: response.status.as_u16(),
        });
    }

    tracing::debug!(url = %url, bytes = response.body.len(), "Fetched service metadata");
    Ok(Some(response.body))
}
