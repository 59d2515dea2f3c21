//! Production HTTP client implementation using reqwest.

use std::time::Instant;

use super::timing::{ConnectSlot, ConnectTimerLayer};
use super::{HttpClient, HttpError, HttpRequest, HttpResponse, TransferTimings};
use crate::config::Timeouts;
use crate::config::defaults::USER_AGENT;

/// Production HTTP client using reqwest.
///
/// A wrapper around `reqwest::Client` that implements the [`HttpClient`]
/// trait. Connections are pooled and kept alive between requests, which
/// the NTLM handshake relies on: both legs must travel over the same
/// connection. Every client speaks HTTP/1.1 only.
///
/// # Example
///
/// ```no_run
/// use ntlm_soap::config::Timeouts;
/// use ntlm_soap::transport::{HttpClient, HttpRequest, ReqwestClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::configured(&Timeouts::default())?;
/// let url = Url::parse("http://server/service.svc?wsdl")?;
/// let response = client.request(HttpRequest::get(url)).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
    connect_slot: ConnectSlot,
}

impl ReqwestClient {
    /// Creates a client with the given timeouts, the crate's user agent
    /// and connect-time measurement.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Connection`] if the TLS backend or resolver
    /// cannot be initialized.
    pub fn configured(timeouts: &Timeouts) -> Result<Self, HttpError> {
        let connect_slot = ConnectSlot::new();
        let inner = reqwest::Client::builder()
            .http1_only()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.request)
            .user_agent(USER_AGENT)
            .connector_layer(ConnectTimerLayer::new(connect_slot.clone()))
            .build()
            .map_err(|e| HttpError::Connection(Box::new(e)))?;

        Ok(Self {
            inner,
            connect_slot,
        })
    }

    /// Creates an HTTP client from an existing reqwest client.
    ///
    /// Connect times are always reported as zero for such clients.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            inner: client,
            connect_slot: ConnectSlot::new(),
        }
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self
            .inner
            .request(req.method, req.url.as_str())
            .version(req.version);

        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        self.connect_slot.reset();
        let started = Instant::now();

        let response = builder.send().await.map_err(map_send_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(map_send_error)?
            .to_vec();

        let timings = TransferTimings::new(started.elapsed(), self.connect_slot.take());

        Ok(HttpResponse::new(status, headers, body).with_timings(timings))
    }
}

fn map_send_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_builder() {
        HttpError::InvalidUrl(e.to_string())
    } else {
        HttpError::Connection(Box::new(e))
    }
}
