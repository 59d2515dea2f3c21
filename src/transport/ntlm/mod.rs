//! NTLM authentication as an [`HttpClient`] decorator.
//!
//! [`NtlmClient`] runs the three-message NTLM handshake around any inner
//! client:
//!
//! 1. The request is sent with `Authorization: NTLM <negotiate>` and an
//!    empty body.
//! 2. A `401` carrying `WWW-Authenticate: NTLM <challenge>` is answered by
//!    resending the request with `Authorization: NTLM <authenticate>` and
//!    the full body.
//!
//! If the first leg yields no challenge the original request is sent again
//! without authentication and that response is returned. NTLM authenticates
//! the connection rather than the request, so both legs depend on the inner
//! client keeping the connection alive between them.

mod crypto;
mod message;


use std::time::SystemTime;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse, NtlmError};
use crate::config::Credentials;

use message::{Challenge, Nonce};

#[cfg(test)]
pub(crate) use crypto::{nt_proof_str, ntowf_v2, utf16le};
#[cfg(test)]
pub(crate) use message::read_buffer;

/// Scheme prefix in `Authorization` and `WWW-Authenticate` values.
const SCHEME: &str = "NTLM";

/// HTTP client decorator that authenticates every request with NTLMv2.
///
/// The `username` may carry a domain as `DOMAIN\user`.
#[derive(Debug)]
pub struct NtlmClient<'a, H> {
    inner: &'a H,
    credentials: &'a Credentials,
}

impl<'a, H> NtlmClient<'a, H> {
    /// Wraps `inner` so that requests authenticate with `credentials`.
    #[must_use]
    pub const fn new(inner: &'a H, credentials: &'a Credentials) -> Self {
        Self { inner, credentials }
    }
}

impl<H: HttpClient> HttpClient for NtlmClient<'_, H> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut negotiate = authorized(&req, &message::negotiate());
        negotiate.body = None;
        let first = self.inner.request(negotiate).await?;

        let Some(challenge) = challenge_from(&first)? else {
            tracing::debug!(
                status = %first.status,
                "No NTLM challenge, resending without authentication"
            );
            let replay = self.inner.request(req).await?;
            let timings = first.timings.combined(replay.timings);
            return Ok(replay.with_timings(timings));
        };

        let (domain, user) = self.credentials.domain_and_user();
        let token = message::authenticate(
            &challenge,
            user,
            domain,
            self.credentials.password(),
            fresh_nonce(),
        );
        let authenticate = authorized(&req, &token);

        let second = self.inner.request(authenticate).await?;
        let timings = first.timings.combined(second.timings);
        Ok(second.with_timings(timings))
    }
}

/// A fresh client challenge and the current time.
fn fresh_nonce() -> Nonce {
    Nonce {
        client_challenge: rand::random(),
        timestamp: crypto::filetime(SystemTime::now()),
    }
}

/// Copies `req` with an NTLM `Authorization` header carrying `token`.
fn authorized(req: &HttpRequest, token: &[u8]) -> HttpRequest {
    let value = format!("{SCHEME} {}", STANDARD.encode(token));
    let mut out = req.clone();
    // Base64 output is always a valid header value
    if let Ok(value) = http::HeaderValue::from_str(&value) {
        out.headers.insert(http::header::AUTHORIZATION, value);
    }
    out
}

/// Extracts the challenge from a `401` response, if there is one.
///
/// # Errors
///
/// Returns [`NtlmError`] if the response carries an NTLM token that cannot
/// be decoded or parsed.
fn challenge_from(response: &HttpResponse) -> Result<Option<Challenge>, NtlmError> {
    if response.status != http::StatusCode::UNAUTHORIZED {
        return Ok(None);
    }

    let Some(token) = response
        .headers
        .get_all(http::header::WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(challenge_token)
    else {
        return Ok(None);
    };

    let bytes = STANDARD
        .decode(token)
        .map_err(|e| NtlmError::InvalidBase64(e.to_string()))?;
    Challenge::parse(&bytes).map(Some)
}

/// Returns the token of an `NTLM <token>` header value.
fn challenge_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case(SCHEME) && !token.is_empty()).then_some(token)
}
