//! The raw configuration bundle accepted at client construction.
//!
//! [`ClientOptions`] mirrors what a caller (or a TOML file) provides before
//! any validation. Every field is optional so that partial bundles from
//! different sources can be merged; [`EndpointConfig::from_options`]
//! performs the validation.
//!
//! [`EndpointConfig::from_options`]: super::EndpointConfig::from_options

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Construction options for a SOAP client.
///
/// Recognized keys are `url`, `protocol`, `username`, `password`,
/// `location`, `fetch_wsdl` and the `[timeouts]` table. Any other key is
/// kept verbatim in [`passthrough`](Self::passthrough) and never
/// reinterpreted.
///
/// # Example
///
/// ```
/// use ntlm_soap::config::ClientOptions;
///
/// let options = ClientOptions::new("http://svc/test")
///     .with_credentials("user", "secret")
///     .with_protocol("https");
///
/// assert_eq!(options.url.as_deref(), Some("http://svc/test"));
/// ```
#[derive(Clone, Default, Deserialize)]
pub struct ClientOptions {
    /// Endpoint (or WSDL) URL
    pub url: Option<String>,

    /// Protocol scheme: "http" or "https"
    pub protocol: Option<String>,

    /// NTLM user name, optionally `DOMAIN\user`
    pub username: Option<String>,

    /// NTLM password
    pub password: Option<String>,

    /// SOAP endpoint for calls (default: `url` without query)
    pub location: Option<String>,

    /// Fetch the service metadata during construction
    pub fetch_wsdl: Option<bool>,

    /// Timeout configuration
    #[serde(default)]
    pub timeouts: TimeoutsSection,

    /// Opaque options handed through untouched
    #[serde(flatten)]
    pub passthrough: BTreeMap<String, toml::Value>,
}

/// Timeout configuration section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutsSection {
    /// Connect timeout in seconds
    pub connect: Option<u64>,

    /// Whole-request timeout in seconds
    pub request: Option<u64>,
}

impl ClientOptions {
    /// Creates options for the given URL with everything else unset.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Sets the protocol scheme.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Sets the NTLM user name and password.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the SOAP endpoint used for calls.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Enables or disables the construction-time metadata fetch.
    #[must_use]
    pub const fn with_fetch_wsdl(mut self, fetch: bool) -> Self {
        self.fetch_wsdl = Some(fetch);
        self
    }

    /// Sets the connect timeout in seconds.
    #[must_use]
    pub const fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.timeouts.connect = Some(secs);
        self
    }

    /// Sets the whole-request timeout in seconds.
    #[must_use]
    pub const fn with_request_timeout(mut self, secs: u64) -> Self {
        self.timeouts.request = Some(secs);
        self
    }

    /// Adds an opaque pass-through option.
    #[must_use]
    pub fn with_passthrough(mut self, key: impl Into<String>, value: toml::Value) -> Self {
        self.passthrough.insert(key.into(), value);
        self
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("url", &self.url)
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("location", &self.location)
            .field("fetch_wsdl", &self.fetch_wsdl)
            .field("timeouts", &self.timeouts)
            .field("passthrough", &self.passthrough)
            .finish()
    }
}
