//! NTLM message encoding and decoding.
//!
//! Only the subset needed by a client is implemented: building the
//! negotiate (type 1) and authenticate (type 3) messages and parsing the
//! challenge (type 2) message. No version field, MIC or session key is
//! sent.

use crate::transport::NtlmError;

use super::crypto;

const SIGNATURE: &[u8; 8] = b"NTLMSSP\0";

const NEGOTIATE: u32 = 1;
const CHALLENGE: u32 = 2;
const AUTHENTICATE: u32 = 3;

/// Negotiate flags.
pub mod flags {
    pub const UNICODE: u32 = 0x0000_0001;
    pub const OEM: u32 = 0x0000_0002;
    pub const REQUEST_TARGET: u32 = 0x0000_0004;
    pub const NTLM: u32 = 0x0000_0200;
    pub const ALWAYS_SIGN: u32 = 0x0000_8000;
    pub const EXTENDED_SESSIONSECURITY: u32 = 0x0008_0000;
    pub const TARGET_INFO: u32 = 0x0080_0000;
    pub const KEY_128: u32 = 0x2000_0000;
    pub const KEY_56: u32 = 0x8000_0000;
}

/// Flags offered in the negotiate message.
pub const NEGOTIATE_FLAGS: u32 = flags::UNICODE
    | flags::OEM
    | flags::REQUEST_TARGET
    | flags::NTLM
    | flags::ALWAYS_SIGN
    | flags::EXTENDED_SESSIONSECURITY
    | flags::TARGET_INFO
    | flags::KEY_128
    | flags::KEY_56;

const CHALLENGE_MIN_LEN: usize = 32;
const CHALLENGE_WITH_TARGET_INFO_LEN: usize = 48;
const AUTHENTICATE_HEADER_LEN: usize = 64;

/// AV pair identifiers.
const AV_EOL: u16 = 0;
const AV_TIMESTAMP: u16 = 7;

/// Builds the 32-byte negotiate message with empty domain and workstation.
pub fn negotiate() -> Vec<u8> {
    let mut out = Vec::with_capacity(32);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&NEGOTIATE.to_le_bytes());
    out.extend_from_slice(&NEGOTIATE_FLAGS.to_le_bytes());
    // Domain and workstation security buffers, both empty
    out.extend_from_slice(&[0; 16]);
    out
}

/// A parsed challenge message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub flags: u32,
    pub server_challenge: [u8; 8],
    pub target_info: Vec<u8>,
}

impl Challenge {
    /// Parses a challenge message.
    ///
    /// # Errors
    ///
    /// Returns [`NtlmError`] if the message is truncated, carries the wrong
    /// signature or type, or its target info buffer is out of bounds.
    pub fn parse(bytes: &[u8]) -> Result<Self, NtlmError> {
        if bytes.len() < CHALLENGE_MIN_LEN {
            return Err(NtlmError::Truncated { len: bytes.len() });
        }
        if &bytes[..8] != SIGNATURE {
            return Err(NtlmError::BadSignature);
        }
        let message_type = read_u32(bytes, 8);
        if message_type != CHALLENGE {
            return Err(NtlmError::UnexpectedType {
                expected: CHALLENGE,
                actual: message_type,
            });
        }

        let flags = read_u32(bytes, 20);
        let mut server_challenge = [0u8; 8];
        server_challenge.copy_from_slice(&bytes[24..32]);

        // Older servers send a 32-byte message without the target info buffer
        let target_info = if bytes.len() >= CHALLENGE_WITH_TARGET_INFO_LEN {
            read_buffer(bytes, 40, "target info")?.to_vec()
        } else {
            Vec::new()
        };

        Ok(Self {
            flags,
            server_challenge,
            target_info,
        })
    }

    /// Server timestamp from the target info, if present.
    pub fn timestamp(&self) -> Option<u64> {
        let mut rest = self.target_info.as_slice();
        while rest.len() >= 4 {
            let id = u16::from_le_bytes([rest[0], rest[1]]);
            let len = usize::from(u16::from_le_bytes([rest[2], rest[3]]));
            if id == AV_EOL {
                break;
            }
            let value = rest.get(4..4 + len)?;
            if id == AV_TIMESTAMP && len == 8 {
                let mut stamp = [0u8; 8];
                stamp.copy_from_slice(value);
                return Some(u64::from_le_bytes(stamp));
            }
            rest = &rest[4 + len..];
        }
        None
    }
}

/// Inputs to the authenticate message that vary per handshake.
#[derive(Debug, Clone, Copy)]
pub struct Nonce {
    pub client_challenge: [u8; 8],
    pub timestamp: u64,
}

/// Builds the authenticate message answering `challenge`.
///
/// When the server supplies a timestamp it replaces `nonce.timestamp`
/// and the LM response is sent as zeros.
pub fn authenticate(
    challenge: &Challenge,
    user: &str,
    domain: &str,
    password: &str,
    nonce: Nonce,
) -> Vec<u8> {
    let ntowf = crypto::ntowf_v2(password, user, domain);

    let (timestamp, lm_response) = match challenge.timestamp() {
        Some(server_time) => (server_time, [0u8; 24]),
        None => (
            nonce.timestamp,
            crypto::lmv2_response(
                &ntowf,
                &challenge.server_challenge,
                &nonce.client_challenge,
            ),
        ),
    };
    let nt_response = crypto::ntlmv2_response(
        &ntowf,
        &challenge.server_challenge,
        &nonce.client_challenge,
        timestamp,
        &challenge.target_info,
    );

    let domain = crypto::utf16le(domain);
    let user = crypto::utf16le(user);
    let workstation: Vec<u8> = Vec::new();
    let session_key: Vec<u8> = Vec::new();

    // Payload order: domain, user, workstation, LM, NT, session key
    let payload: [&[u8]; 6] = [
        &domain,
        &user,
        &workstation,
        &lm_response,
        &nt_response,
        &session_key,
    ];
    let mut offsets = [0usize; 6];
    let mut cursor = AUTHENTICATE_HEADER_LEN;
    for (offset, field) in offsets.iter_mut().zip(payload) {
        *offset = cursor;
        cursor += field.len();
    }

    let mut out = Vec::with_capacity(cursor);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&AUTHENTICATE.to_le_bytes());
    // Header buffer order: LM, NT, domain, user, workstation, session key
    for index in [3, 4, 0, 1, 2, 5] {
        write_buffer(&mut out, payload[index].len(), offsets[index]);
    }
    let negotiated = (challenge.flags & NEGOTIATE_FLAGS) | flags::UNICODE;
    out.extend_from_slice(&negotiated.to_le_bytes());
    for field in payload {
        out.extend_from_slice(field);
    }
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Reads the security buffer descriptor at `at` and returns its contents.
pub(crate) fn read_buffer<'a>(
    bytes: &'a [u8],
    at: usize,
    field: &'static str,
) -> Result<&'a [u8], NtlmError> {
    let out_of_bounds = || NtlmError::BufferOutOfBounds { field };
    let header = bytes.get(at..at + 8).ok_or_else(out_of_bounds)?;
    let len = usize::from(u16::from_le_bytes([header[0], header[1]]));
    let offset = read_u32(header, 4) as usize;
    bytes.get(offset..offset + len).ok_or_else(out_of_bounds)
}

fn write_buffer(out: &mut Vec<u8>, len: usize, offset: usize) {
    // Field lengths are bounded by short credentials and target info
    let len = u16::try_from(len).unwrap_or(u16::MAX);
    let offset = u32::try_from(offset).unwrap_or(u32::MAX);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&offset.to_le_bytes());
}
