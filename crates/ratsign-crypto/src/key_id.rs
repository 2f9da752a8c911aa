//! Key fingerprints.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codec;
use crate::error::CryptoResult;
use crate::keypair::PublicKey;

/// Short fingerprint of a public key: `SHA-256` of the uncompressed point.
///
/// Displayed as Base64. Two ids are equal iff their decoded bytes are
/// equal, so differently padded or whitespace-wrapped text forms of the
/// same id compare equal once parsed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyId([u8; 32]);

impl KeyId {
    /// Compute the id of a public key.
    #[must_use]
    pub fn of(public_key: &PublicKey) -> Self {
        Self(Sha256::digest(public_key.as_bytes()).into())
    }

    /// Compute the id of a Base64-encoded public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid uncompressed P-256 point.
    pub fn from_public_key_base64(public_key: &str) -> CryptoResult<Self> {
        Ok(Self::of(&PublicKey::from_base64(public_key)?))
    }

    /// Parse a Base64 key id.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidBase64Encoding`](crate::CryptoError::InvalidBase64Encoding)
    /// or [`CryptoError::InvalidKeyLength`](crate::CryptoError::InvalidKeyLength)
    /// if the input does not decode to 32 bytes.
    pub fn from_base64(s: &str) -> CryptoResult<Self> {
        codec::decode_base64_array::<32>(s).map(Self)
    }

    /// Encode as Base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        codec::encode_base64(&self.0)
    }

    /// Lowercase hex of the first 4 bytes, used in default key file names.
    #[must_use]
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Get the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self.to_base64())
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}

impl Serialize for KeyId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for KeyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_base64(&s).map_err(serde::de::Error::custom)
    }
}
