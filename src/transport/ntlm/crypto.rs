//! NTLMv2 response computation.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use md4::{Digest, Md4};
use md5::Md5;

type HmacMd5 = Hmac<Md5>;

/// Seconds between 1601-01-01 and 1970-01-01.
const EPOCH_DIFFERENCE_SECS: u64 = 11_644_473_600;

/// Blob version and high-version bytes followed by six reserved zeros.
const BLOB_HEADER: [u8; 8] = [0x01, 0x01, 0, 0, 0, 0, 0, 0];

/// Encodes a string as UTF-16LE.
pub fn utf16le(value: &str) -> Vec<u8> {
    value.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Converts a wall-clock time to a Windows FILETIME (100ns ticks since 1601).
pub fn filetime(time: SystemTime) -> u64 {
    let since_unix = time.duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = since_unix.as_secs() + EPOCH_DIFFERENCE_SECS;
    secs * 10_000_000 + u64::from(since_unix.subsec_nanos() / 100)
}

/// MD4 of the UTF-16LE password.
pub fn nt_hash(password: &str) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&Md4::digest(utf16le(password)));
    out
}

/// The NTLMv2 one-way function: keyed on the NT hash, over the
/// upper-cased user name concatenated with the domain.
pub fn ntowf_v2(password: &str, user: &str, domain: &str) -> [u8; 16] {
    let identity = utf16le(&format!("{}{domain}", user.to_uppercase()));
    hmac_md5(&nt_hash(password), &[&identity])
}

/// LMv2 response: HMAC over both challenges, followed by the client challenge.
pub fn lmv2_response(
    ntowf: &[u8; 16],
    server_challenge: &[u8; 8],
    client_challenge: &[u8; 8],
) -> [u8; 24] {
    let proof = hmac_md5(ntowf, &[server_challenge, client_challenge]);
    let mut out = [0u8; 24];
    out[..16].copy_from_slice(&proof);
    out[16..].copy_from_slice(client_challenge);
    out
}

/// NTLMv2 response: `NTProofStr` followed by the client blob.
///
/// `target_info` is the raw AV pair list from the challenge, including its
/// terminator.
pub fn ntlmv2_response(
    ntowf: &[u8; 16],
    server_challenge: &[u8; 8],
    client_challenge: &[u8; 8],
    timestamp: u64,
    target_info: &[u8],
) -> Vec<u8> {
    let mut blob = Vec::with_capacity(BLOB_HEADER.len() + 24 + target_info.len() + 4);
    blob.extend_from_slice(&BLOB_HEADER);
    blob.extend_from_slice(&timestamp.to_le_bytes());
    blob.extend_from_slice(client_challenge);
    blob.extend_from_slice(&[0; 4]);
    blob.extend_from_slice(target_info);
    blob.extend_from_slice(&[0; 4]);

    let proof = nt_proof_str(ntowf, server_challenge, &blob);

    let mut out = Vec::with_capacity(proof.len() + blob.len());
    out.extend_from_slice(&proof);
    out.extend_from_slice(&blob);
    out
}

/// `NTProofStr`: HMAC over the server challenge and the client blob.
pub fn nt_proof_str(ntowf: &[u8; 16], server_challenge: &[u8; 8], blob: &[u8]) -> [u8; 16] {
    hmac_md5(ntowf, &[server_challenge, blob])
}

fn hmac_md5(key: &[u8], parts: &[&[u8]]) -> [u8; 16] {
    let mut mac = HmacMd5::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 16];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}
