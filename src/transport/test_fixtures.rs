//! Test doubles shared by transport, client and binary tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::ntlm::{nt_proof_str, ntowf_v2, read_buffer, utf16le};
use super::{HttpClient, HttpError, HttpRequest, HttpResponse, TransferTimings};

pub const SERVER_CHALLENGE: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef];

/// Builds a response with the given status and body.
pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse::new(
        http::StatusCode::from_u16(status).unwrap(),
        http::HeaderMap::new(),
        body.as_bytes().to_vec(),
    )
}

/// Mock HTTP client that returns a configurable sequence of responses.
#[derive(Debug)]
pub struct MockClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Answers every request with the same status and body.
    pub fn replying(status: u16, body: &str) -> Self {
        Self::new((0..16).map(|_| Ok(response(status, body))).collect())
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(HttpError::Timeout)])
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);
        self.responses.lock().unwrap().remove(0)
    }
}

/// Encodes AV pairs followed by the end-of-list marker.
pub fn av_pairs(pairs: &[(u16, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    for (id, value) in pairs {
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&u16::try_from(value.len()).unwrap().to_le_bytes());
        out.extend_from_slice(value);
    }
    out.extend_from_slice(&[0; 4]);
    out
}

/// Target info naming domain `Domain` and server `Server`.
pub fn sample_target_info() -> Vec<u8> {
    av_pairs(&[
        (2, utf16le("Domain").as_slice()),
        (1, utf16le("Server").as_slice()),
    ])
}

/// Builds a challenge message carrying `target_info`.
pub fn challenge_bytes(server_challenge: [u8; 8], target_info: &[u8]) -> Vec<u8> {
    let flags: u32 = 0x0000_0001 | 0x0000_0200 | 0x0008_0000 | 0x0080_0000;
    let len = u16::try_from(target_info.len()).unwrap();

    let mut out = Vec::new();
    out.extend_from_slice(b"NTLMSSP\0");
    out.extend_from_slice(&2u32.to_le_bytes());
    // Empty target name at offset 48
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(&48u32.to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&server_challenge);
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&48u32.to_le_bytes());
    out.extend_from_slice(target_info);
    out
}

/// A `401` carrying an NTLM challenge.
pub fn challenge_response(challenge: &[u8]) -> HttpResponse {
    let mut headers = http::HeaderMap::new();
    headers.insert(
        http::header::WWW_AUTHENTICATE,
        http::HeaderValue::from_str(&format!("NTLM {}", STANDARD.encode(challenge))).unwrap(),
    );
    HttpResponse::new(http::StatusCode::UNAUTHORIZED, headers, Vec::new())
}

/// Decodes the NTLM token of a request's `Authorization` header.
pub fn ntlm_token(req: &HttpRequest) -> Option<Vec<u8>> {
    let value = req.headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("NTLM ")?;
    STANDARD.decode(token).ok()
}

/// Returns the message type of an NTLM token.
pub fn message_type(token: &[u8]) -> u32 {
    u32::from_le_bytes([token[8], token[9], token[10], token[11]])
}

/// Fields decoded from an authenticate message.
#[derive(Debug)]
pub struct Authenticate {
    pub lm_response: Vec<u8>,
    pub nt_response: Vec<u8>,
    pub domain: String,
    pub user: String,
    pub workstation: String,
    pub flags: u32,
}

impl Authenticate {
    pub fn parse(token: &[u8]) -> Self {
        let text = |at, field| {
            let raw = read_buffer(token, at, field).unwrap();
            let units: Vec<u16> = raw
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).unwrap()
        };

        Self {
            lm_response: read_buffer(token, 12, "lm").unwrap().to_vec(),
            nt_response: read_buffer(token, 20, "nt").unwrap().to_vec(),
            domain: text(28, "domain"),
            user: text(36, "user"),
            workstation: text(44, "workstation"),
            flags: u32::from_le_bytes([token[60], token[61], token[62], token[63]]),
        }
    }

    /// Checks the `NTProofStr` the way a server holding `password` would.
    pub fn proves(&self, password: &str, server_challenge: &[u8; 8]) -> bool {
        if self.nt_response.len() < 16 {
            return false;
        }
        let ntowf = ntowf_v2(password, &self.user, &self.domain);
        let (proof, blob) = self.nt_response.split_at(16);
        nt_proof_str(&ntowf, server_challenge, blob) == proof
    }
}

/// Mock server speaking NTLM.
///
/// Negotiate messages are answered with a challenge. Authenticate messages
/// that prove `username`/`password` get the configured reply (GET requests
/// get the metadata reply). Anything else gets a bare `401 NTLM`.
#[derive(Debug)]
pub struct NtlmServer {
    user: String,
    domain: String,
    password: String,
    reply: HttpResponse,
    metadata: HttpResponse,
    requests: Mutex<Vec<HttpRequest>>,
    authenticated: AtomicUsize,
}

impl NtlmServer {
    pub fn new(user: &str, password: &str) -> Self {
        Self {
            user: user.to_string(),
            domain: String::new(),
            password: password.to_string(),
            reply: response(200, "<ok/>"),
            metadata: response(200, "<definitions/>"),
            requests: Mutex::new(Vec::new()),
            authenticated: AtomicUsize::new(0),
        }
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    pub fn with_reply(mut self, reply: HttpResponse) -> Self {
        self.reply = reply.with_timings(TransferTimings::new(
            std::time::Duration::from_millis(5),
            std::time::Duration::ZERO,
        ));
        self
    }

    pub fn with_metadata(mut self, metadata: HttpResponse) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests that completed authentication.
    pub fn authenticated(&self) -> usize {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn denied() -> HttpResponse {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::WWW_AUTHENTICATE,
            http::HeaderValue::from_static("NTLM"),
        );
        HttpResponse::new(http::StatusCode::UNAUTHORIZED, headers, Vec::new())
    }
}

impl HttpClient for NtlmServer {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(req.clone());

        let Some(token) = ntlm_token(&req) else {
            return Ok(Self::denied());
        };

        match message_type(&token) {
            1 => Ok(challenge_response(&challenge_bytes(
                SERVER_CHALLENGE,
                &sample_target_info(),
            ))),
            3 => {
                let auth = Authenticate::parse(&token);
                let valid = auth.user == self.user
                    && auth.domain == self.domain
                    && auth.proves(&self.password, &SERVER_CHALLENGE);
                if !valid {
                    return Ok(Self::denied());
                }
                self.authenticated.fetch_add(1, Ordering::SeqCst);
                if req.method == http::Method::GET {
                    Ok(self.metadata.clone())
                } else {
                    Ok(self.reply.clone())
                }
            }
            _ => Ok(Self::denied()),
        }
    }
}
