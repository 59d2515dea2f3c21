//! Per-scheme transport handlers with scoped overrides.
//!
//! A [`TransportRegistry`] decides how application-level requests for a
//! URL scheme are sent: plainly, or through an NTLM-authenticating
//! decorator. NTLM-mode client construction installs a temporary override
//! for its scheme, performs its bootstrap request through the registry and
//! then restores the previous handler, so requests made outside the
//! construction window never see the client's credentials.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ntlm::NtlmClient;
use super::{HttpClient, HttpError, HttpRequest, HttpResponse, RegistryError};
use crate::config::Credentials;

/// How requests for one scheme are sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SchemeHandler {
    /// Requests are sent unchanged.
    #[default]
    Plain,
    /// Requests are authenticated with NTLM using these credentials.
    Ntlm(Credentials),
}

/// Registry of per-scheme handlers.
///
/// Schemes without an entry use [`SchemeHandler::Plain`].
#[derive(Debug, Default)]
pub struct TransportRegistry {
    handlers: Mutex<HashMap<String, Entry>>,
    construction: tokio::sync::Mutex<()>,
}

#[derive(Debug, Clone, Default)]
struct Entry {
    handler: SchemeHandler,
    overridden: bool,
}

impl TransportRegistry {
    /// Creates a registry with every scheme plain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handler currently in effect for `scheme`.
    #[must_use]
    pub fn handler(&self, scheme: &str) -> SchemeHandler {
        self.lock()
            .get(&scheme.to_ascii_lowercase())
            .map(|entry| entry.handler.clone())
            .unwrap_or_default()
    }

    /// Returns true while an override is active for `scheme`.
    #[must_use]
    pub fn is_overridden(&self, scheme: &str) -> bool {
        self.lock()
            .get(&scheme.to_ascii_lowercase())
            .is_some_and(|entry| entry.overridden)
    }

    /// Installs an NTLM handler for `scheme` until the guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Conflict`] if an override is already active
    /// for `scheme`. The existing handler is left untouched.
    pub fn scoped_override(
        &self,
        scheme: &str,
        credentials: Credentials,
    ) -> Result<OverrideGuard<'_>, RegistryError> {
        let scheme = scheme.to_ascii_lowercase();
        let mut handlers = self.lock();
        let entry = handlers.entry(scheme.clone()).or_default();

        if entry.overridden {
            return Err(RegistryError::Conflict { scheme });
        }

        let previous = std::mem::replace(&mut entry.handler, SchemeHandler::Ntlm(credentials));
        entry.overridden = true;
        tracing::debug!(scheme = %scheme, "Installed scoped NTLM handler");

        Ok(OverrideGuard {
            registry: self,
            scheme,
            previous: Some(previous),
        })
    }

    /// Serializes construction windows against this registry.
    ///
    /// Hold the returned guard for the whole construction, including any
    /// override and the metadata fetch.
    pub async fn lock_construction(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.construction.lock().await
    }

    /// Sends `req` through the handler for its URL scheme.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the exchange fails.
    pub async fn fetch<H: HttpClient>(
        &self,
        http: &H,
        req: HttpRequest,
    ) -> Result<HttpResponse, HttpError> {
        match self.handler(req.url.scheme()) {
            SchemeHandler::Plain => http.request(req).await,
            SchemeHandler::Ntlm(credentials) => {
                NtlmClient::new(http, &credentials).request(req).await
            }
        }
    }

    fn restore(&self, scheme: &str, previous: SchemeHandler) {
        let mut handlers = self.lock();
        if let Some(entry) = handlers.get_mut(scheme) {
            entry.handler = previous;
            entry.overridden = false;
        }
        tracing::debug!(scheme = %scheme, "Restored previous handler");
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Restores the previous handler for a scheme when dropped.
#[derive(Debug)]
#[must_use = "the override is removed as soon as the guard is dropped"]
pub struct OverrideGuard<'a> {
    registry: &'a TransportRegistry,
    scheme: String,
    previous: Option<SchemeHandler>,
}

impl OverrideGuard<'_> {
    /// The scheme this guard overrides.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

impl Drop for OverrideGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.registry.restore(&self.scheme, previous);
        }
    }
}
