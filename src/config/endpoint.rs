//! Validated endpoint configuration.
//!
//! [`EndpointConfig`] is what a client owns for its lifetime: the endpoint
//! URL, the protocol scheme, optional NTLM credentials and the transport
//! timeouts. All validation happens in [`EndpointConfig::from_options`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use url::Url;

use super::defaults;
use super::error::{ConfigError, field};
use super::options::ClientOptions;

/// Protocol scheme of the endpoint.
///
/// Only `http` and `https` exist. Parsing is exact: `"HTTP"` or `"ftp"`
/// are not protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Plain HTTP
    #[default]
    Http,
    /// HTTP over TLS
    Https,
}

impl Protocol {
    /// Parses a protocol name, returning `None` for anything unrecognized.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            _ => None,
        }
    }

    /// Returns the scheme name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NTLM user name and password.
///
/// The `Debug` output never contains the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from a user name and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the user name as configured.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Splits a `DOMAIN\user` user name into `(domain, user)`.
    ///
    /// A user name without a backslash has an empty domain.
    #[must_use]
    pub fn domain_and_user(&self) -> (&str, &str) {
        self.username
            .split_once('\\')
            .unwrap_or(("", self.username.as_str()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Transport timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// TCP/TLS connect timeout
    pub connect: Duration,
    /// Whole-request timeout
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: defaults::connect_timeout(),
            request: defaults::request_timeout(),
        }
    }
}

/// Fully validated endpoint configuration.
///
/// # Construction
///
/// Use [`EndpointConfig::from_options`]. The protocol starts as `http`,
/// takes the URL's scheme when that is `http` or `https`, and finally
/// takes the `protocol` option when that is valid. Invalid values are
/// ignored at every step.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    url: Url,
    protocol: Protocol,
    credentials: Option<Credentials>,
    location: Url,
    fetch_metadata: bool,
    timeouts: Timeouts,
    passthrough: BTreeMap<String, toml::Value>,
}

impl EndpointConfig {
    /// Validates a configuration bundle.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `url` is missing or empty
    /// - `url` or `location` is not a valid URL
    /// - a timeout is zero
    pub fn from_options(options: &ClientOptions) -> Result<Self, ConfigError> {
        let url = resolve_url(options)?;
        let location = resolve_location(options, &url)?;
        let timeouts = resolve_timeouts(options)?;

        let fetch_metadata = options.fetch_wsdl.unwrap_or_else(|| {
            url.query()
                .is_some_and(|query| query.eq_ignore_ascii_case("wsdl"))
        });

        let mut config = Self {
            protocol: Protocol::default(),
            credentials: resolve_credentials(options),
            url,
            location,
            fetch_metadata,
            timeouts,
            passthrough: options.passthrough.clone(),
        };

        let url_scheme = config.url.scheme().to_string();
        config.set_protocol(&url_scheme);
        if let Some(protocol) = options.protocol.as_deref() {
            config.set_protocol(protocol);
        }

        Ok(config)
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the current protocol scheme.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Sets the protocol scheme.
    ///
    /// Anything other than `"http"` or `"https"` is ignored and the
    /// previous value is kept.
    pub fn set_protocol(&mut self, protocol: &str) {
        if let Some(parsed) = Protocol::parse(protocol) {
            self.protocol = parsed;
        }
    }

    /// Returns the NTLM credentials, or `None` in anonymous mode.
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Returns true when calls are NTLM-authenticated.
    #[must_use]
    pub const fn is_ntlm(&self) -> bool {
        self.credentials.is_some()
    }

    /// Returns the SOAP endpoint used for calls.
    #[must_use]
    pub const fn location(&self) -> &Url {
        &self.location
    }

    /// Returns true when construction fetches the service metadata.
    #[must_use]
    pub const fn fetch_metadata(&self) -> bool {
        self.fetch_metadata
    }

    /// Returns the transport timeouts.
    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Returns the opaque pass-through options.
    #[must_use]
    pub const fn passthrough(&self) -> &BTreeMap<String, toml::Value> {
        &self.passthrough
    }
}

impl fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = self
            .credentials
            .as_ref()
            .map_or("anonymous", Credentials::username);

        write!(
            f,
            "Endpoint {{ url: {}, protocol: {}, location: {}, auth: {}, fetch_wsdl: {}, \
             timeouts: {}s/{}s }}",
            self.url,
            self.protocol,
            self.location,
            user,
            self.fetch_metadata,
            self.timeouts.connect.as_secs(),
            self.timeouts.request.as_secs(),
        )
    }
}

fn resolve_url(options: &ClientOptions) -> Result<Url, ConfigError> {
    let url_str = options
        .url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::missing(field::URL, "Use --url or set url in config file"))?;

    parse_url(url_str)
}

fn resolve_location(options: &ClientOptions, url: &Url) -> Result<Url, ConfigError> {
    if let Some(location) = options.location.as_deref().filter(|s| !s.is_empty()) {
        return parse_url(location);
    }

    let mut location = url.clone();
    location.set_query(None);
    location.set_fragment(None);
    Ok(location)
}

fn resolve_credentials(options: &ClientOptions) -> Option<Credentials> {
    let username = options.username.as_deref().filter(|s| !s.is_empty());
    let password = options.password.as_deref().filter(|s| !s.is_empty());

    if username.is_none() && password.is_none() {
        return None;
    }

    Some(Credentials::new(
        username.unwrap_or_default(),
        password.unwrap_or_default(),
    ))
}

fn resolve_timeouts(options: &ClientOptions) -> Result<Timeouts, ConfigError> {
    let connect = options
        .timeouts
        .connect
        .unwrap_or(defaults::CONNECT_TIMEOUT_SECS);
    let request = options
        .timeouts
        .request
        .unwrap_or(defaults::REQUEST_TIMEOUT_SECS);

    if connect == 0 {
        return Err(ConfigError::InvalidDuration {
            field: "timeouts.connect",
            reason: "must be greater than 0".to_string(),
        });
    }

    if request == 0 {
        return Err(ConfigError::InvalidDuration {
            field: "timeouts.request",
            reason: "must be greater than 0".to_string(),
        });
    }

    Ok(Timeouts {
        connect: Duration::from_secs(connect),
        request: Duration::from_secs(request),
    })
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        url: value.to_string(),
        reason: e.to_string(),
    })
}
