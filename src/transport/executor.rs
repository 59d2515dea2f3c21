//! SOAP request execution with per-call records.

use std::fmt;
use std::sync::Arc;

use url::Url;

use super::ntlm::NtlmClient;
use super::{HttpClient, HttpError, HttpRequest, HttpResponse, TransportError};
use crate::config::Credentials;
use crate::config::defaults::USER_AGENT;
use crate::observer::{CallLevel, CallObserver, CallRecord, NoopObserver};
use crate::time::{Clock, SystemClock};

/// Content type of every SOAP request.
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Sends SOAP envelopes over HTTP and reports each call to an observer.
///
/// When credentials are set, every request runs the NTLM handshake with
/// exactly those credentials; otherwise requests are sent as-is and never
/// carry an `Authorization` header.
///
/// # Type Parameters
///
/// - `H`: The HTTP engine
/// - `C`: The clock measuring wall time
pub struct TransportExecutor<H, C = SystemClock> {
    http: H,
    clock: C,
    observer: Arc<dyn CallObserver>,
    credentials: Option<Credentials>,
}

impl<H> TransportExecutor<H, SystemClock> {
    /// Creates an anonymous executor with the system clock and no observer.
    #[must_use]
    pub fn new(http: H) -> Self {
        Self {
            http,
            clock: SystemClock,
            observer: Arc::new(NoopObserver),
            credentials: None,
        }
    }
}

impl<H, C> TransportExecutor<H, C> {
    /// Authenticates every request with `credentials`.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the observer receiving call records.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Sets the clock used for wall-time measurement.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> TransportExecutor<H, C2> {
        TransportExecutor {
            http: self.http,
            clock,
            observer: self.observer,
            credentials: self.credentials,
        }
    }

    /// The HTTP engine.
    pub const fn http(&self) -> &H {
        &self.http
    }

    /// The configured credentials, if any.
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

impl<H: HttpClient, C: Clock> TransportExecutor<H, C> {
    /// Posts `request_body` to `location` as the SOAP action `action`.
    ///
    /// The response is returned whatever its status; a non-200 status is
    /// not an error. Exactly one record is handed to the observer, at
    /// [`CallLevel::Debug`] for HTTP 200 and [`CallLevel::Error`] otherwise,
    /// including when the call fails.
    ///
    /// # Errors
    ///
    /// - [`TransportError::InvalidAction`] if `action` cannot be sent as a
    ///   header value
    /// - [`TransportError::Http`] if the exchange fails before a response
    ///   is received
    pub async fn execute(
        &self,
        request_body: &str,
        location: &Url,
        action: &str,
    ) -> Result<HttpResponse, TransportError> {
        let message = format!("SoapCall: {action}");
        let record = CallRecord::new(action, location.as_str(), request_body);

        let request = match build_soap_request(location, action, request_body) {
            Ok(request) => request,
            Err(e) => {
                self.observer.log(CallLevel::Error, &message, &record);
                return Err(e);
            }
        };

        let started = self.clock.now();
        let result = self.send(request).await;
        let record = record.with_wall_time(self.clock.now().duration_since(started));

        match result {
            Ok(response) => {
                let record = record
                    .with_response(response.status.as_u16(), &response.body)
                    .with_engine_times(response.timings.total, response.timings.connect);
                self.observer
                    .log(CallLevel::for_status(record.http_status), &message, &record);
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(action, error = %e, "SOAP transfer failed");
                self.observer.log(CallLevel::Error, &message, &record);
                Err(e.into())
            }
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        match &self.credentials {
            Some(credentials) => {
                NtlmClient::new(&self.http, credentials)
                    .request(request)
                    .await
            }
            None => self.http.request(request).await,
        }
    }
}

impl<H: fmt::Debug, C: fmt::Debug> fmt::Debug for TransportExecutor<H, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportExecutor")
            .field("http", &self.http)
            .field("clock", &self.clock)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Builds the HTTP/1.1 POST carrying a SOAP envelope.
///
/// Headers: `Method: POST`, `User-Agent`, `Content-Type` and the quoted
/// `SOAPAction`. The body is the envelope unmodified.
///
/// # Errors
///
/// Returns [`TransportError::InvalidAction`] if the quoted action is not a
/// valid header value.
pub fn build_soap_request(
    location: &Url,
    action: &str,
    request_body: &str,
) -> Result<HttpRequest, TransportError> {
    let soap_action = http::HeaderValue::from_str(&format!("\"{action}\"")).map_err(|e| {
        TransportError::InvalidAction {
            action: action.to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(HttpRequest::post(location.clone())
        .with_header(
            http::HeaderName::from_static("method"),
            http::HeaderValue::from_static("POST"),
        )
        .with_header(
            http::header::USER_AGENT,
            http::HeaderValue::from_static(USER_AGENT),
        )
        .with_header(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static(SOAP_CONTENT_TYPE),
        )
        .with_header(http::HeaderName::from_static("soapaction"), soap_action)
        .with_body(request_body.as_bytes().to_vec()))
}
