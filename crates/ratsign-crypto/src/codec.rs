//! Text and container encodings shared by key files and signature files.
//!
//! Binary values travel as standard, padded Base64. Containers are
//! pretty-printed JSON with a trailing newline so they diff cleanly.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CryptoError, CryptoResult};

/// Upper bound for a key or signature container on disk (64 KiB).
///
/// Both formats are a few hundred bytes; anything larger is rejected
/// before parsing.
pub const MAX_CONTAINER_SIZE: usize = 65_536;

/// Encode bytes as standard Base64.
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard Base64, ignoring surrounding whitespace.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidBase64Encoding`] if the input is not valid Base64.
pub fn decode_base64(s: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(s.trim())
        .map_err(|_| CryptoError::InvalidBase64Encoding)
}

/// Decode Base64 into a fixed-size array.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidBase64Encoding`] on bad Base64 and
/// [`CryptoError::InvalidKeyLength`] if the decoded length is not `N`.
pub fn decode_base64_array<const N: usize>(s: &str) -> CryptoResult<[u8; N]> {
    let bytes = decode_base64(s)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength {
            expected: N,
            actual: bytes.len(),
        })
}

/// Serialize a container as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidArgument`] if the value cannot be represented as JSON.
pub fn to_json<T: Serialize>(value: &T) -> CryptoResult<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(value)
        .map_err(|e| CryptoError::InvalidArgument(format!("serialization failed: {e}")))?;
    out.push(b'\n');
    Ok(out)
}

/// Parse a JSON container, enforcing [`MAX_CONTAINER_SIZE`].
///
/// `malformed` builds the error reported for oversize or unparsable input,
/// so key files and signature files each surface their own error kind.
///
/// # Errors
///
/// Returns the error produced by `malformed`.
pub fn from_json<T: DeserializeOwned>(
    bytes: &[u8],
    malformed: fn(String) -> CryptoError,
) -> CryptoResult<T> {
    if bytes.len() > MAX_CONTAINER_SIZE {
        return Err(malformed(format!(
            "{} bytes exceeds the {MAX_CONTAINER_SIZE} byte limit",
            bytes.len()
        )));
    }
    serde_json::from_slice(bytes).map_err(|e| malformed(e.to_string()))
}
