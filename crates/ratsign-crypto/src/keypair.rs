//! P-256 key pairs with secure memory handling.
//!
//! The private scalar lives only inside a [`KeyPair`] and is zeroized when
//! the pair is dropped. Public keys are handled as 65-byte uncompressed
//! SEC1 points (`0x04 || X || Y`).

use std::fmt;

use p256::FieldBytes;
use p256::ecdsa::signature::RandomizedSigner;
use p256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::codec;
use crate::error::{CryptoError, CryptoResult};
use crate::key_id::KeyId;
use crate::signature::Signature;

/// Length of an uncompressed P-256 public point.
pub const PUBLIC_KEY_LEN: usize = 65;

/// Length of a P-256 private scalar.
pub const SECRET_KEY_LEN: usize = 32;

/// SEC1 tag for an uncompressed point.
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Rejection-sampling budget when drawing a scalar from the OS.
///
/// A uniformly random 256-bit value falls outside `[1, n)` with
/// probability below 2^-32, so more than one retry means the RNG is broken.
const MAX_SCALAR_ATTEMPTS: usize = 4;

/// A P-256 key pair.
///
/// `SigningKey` zeroizes its scalar on drop, so the secret never outlives
/// the pair.
pub struct KeyPair {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair from the OS random source.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::RandomnessUnavailable`] if the OS cannot
    /// supply random bytes.
    pub fn generate() -> CryptoResult<Self> {
        let mut seed = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        for _ in 0..MAX_SCALAR_ATTEMPTS {
            OsRng
                .try_fill_bytes(&mut seed[..])
                .map_err(|e| CryptoError::RandomnessUnavailable(e.to_string()))?;
            if let Ok(signing_key) = SigningKey::from_bytes(FieldBytes::from_slice(&seed[..]))
            {
                return Ok(Self::from_signing_key(signing_key));
            }
        }
        Err(CryptoError::RandomnessUnavailable(
            "random source produced no valid scalar".to_owned(),
        ))
    }

    /// Create from a big-endian private scalar (32 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if the slice is not exactly
    /// 32 bytes, or [`CryptoError::InvalidArgument`] if the scalar is zero
    /// or not below the curve order.
    pub fn from_secret_key(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SECRET_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: SECRET_KEY_LEN,
                actual: bytes.len(),
            });
        }

        let signing_key = SigningKey::from_bytes(FieldBytes::from_slice(bytes))
            .map_err(|_| CryptoError::InvalidArgument("private scalar out of range".to_owned()))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = PublicKey::from_verifying_key(signing_key.verifying_key());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Get the public key.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Get the key id (`SHA-256` of the public point).
    #[must_use]
    pub fn key_id(&self) -> KeyId {
        KeyId::of(&self.public_key)
    }

    /// Sign a message with ECDSA-P256-SHA256.
    ///
    /// The nonce is hedged: RFC 6979 derivation mixed with fresh OS
    /// entropy, so signing the same message twice yields different bytes.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig: EcdsaSignature = self.signing_key.sign_with_rng(&mut OsRng, message);
        Signature::from(sig)
    }

    /// Export the private scalar (careful - sensitive!).
    ///
    /// Only used to seal the scalar into a key file.
    pub(crate) fn secret_key_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LEN]> {
        let mut scalar = self.signing_key.to_bytes();
        let mut out = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        out.copy_from_slice(&scalar);
        scalar.as_mut_slice().zeroize();
        out
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("key_id", &self.key_id().to_base64())
            .finish_non_exhaustive()
    }
}

/// A public key: an uncompressed P-256 point (safe to share, serialize, etc.).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }

    /// Parse an uncompressed point.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if the slice is not 65
    /// bytes, or [`CryptoError::InvalidPublicKey`] if it is not an
    /// uncompressed point on P-256.
    pub fn try_from_slice(slice: &[u8]) -> CryptoResult<Self> {
        if slice.len() != PUBLIC_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_LEN,
                actual: slice.len(),
            });
        }
        if slice.first() != Some(&UNCOMPRESSED_TAG) {
            return Err(CryptoError::InvalidPublicKey(
                "expected an uncompressed point (tag 0x04)".to_owned(),
            ));
        }
        VerifyingKey::from_sec1_bytes(slice)
            .map_err(|_| CryptoError::InvalidPublicKey("point is not on P-256".to_owned()))?;

        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// Get the key id of this public key.
    #[must_use]
    pub fn key_id(&self) -> KeyId {
        KeyId::of(self)
    }

    /// Encode as base64 string.
    #[must_use]
    pub fn to_base64(&self) -> String {
        codec::encode_base64(&self.0)
    }

    /// Decode from base64 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid base64 or not a valid
    /// uncompressed P-256 point.
    pub fn from_base64(s: &str) -> CryptoResult<Self> {
        Self::try_from_slice(&codec::decode_base64(s)?)
    }

    /// Verify a signature over `message` with this key.
    ///
    /// Returns `false` for any signature that does not validate.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        // Points are validated on construction, so this only fails if the
        // invariant was bypassed; treat that as "not valid".
        VerifyingKey::from_sec1_bytes(&self.0)
            .is_ok_and(|key| signature.verify_with(&key, message))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}...)", &self.to_base64()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_uncompressed_point() {
        let keypair = KeyPair::generate().unwrap();
        let bytes = keypair.public_key().as_bytes();
        assert_eq!(bytes.len(), PUBLIC_KEY_LEN);
        assert_eq!(bytes[0], 0x04);
    }

    #[test]
    fn test_secret_key_round_trip() {
        let keypair = KeyPair::generate().unwrap();
        let secret = keypair.secret_key_bytes();

        let restored = KeyPair::from_secret_key(&secret[..]).unwrap();
        assert_eq!(restored.public_key(), keypair.public_key());
    }

    #[test]
    fn test_sign_verify() {
        let keypair = KeyPair::generate().unwrap();
        let message = b"hello world";

        let signature = keypair.sign(message);
        assert!(keypair.public_key().verify(message, &signature));

        // Wrong message fails
        assert!(!keypair.public_key().verify(b"wrong", &signature));
    }

    #[test]
    fn test_signatures_are_randomized() {
        let keypair = KeyPair::generate().unwrap();
        let a = keypair.sign(b"same input");
        let b = keypair.sign(b"same input");
        assert_ne!(a.to_der(), b.to_der());
        assert!(keypair.public_key().verify(b"same input", &a));
        assert!(keypair.public_key().verify(b"same input", &b));
    }

    #[test]
    fn test_wrong_key_fails() {
        let signer = KeyPair::generate().unwrap();
        let other = KeyPair::generate().unwrap();
        let sig = signer.sign(b"payload");
        assert!(!other.public_key().verify(b"payload", &sig));
    }

    #[test]
    fn test_invalid_secret_length() {
        let result = KeyPair::from_secret_key(&[1u8; 31]);
        assert!(matches!(result, Err(CryptoError::InvalidKeyLength { .. })));
    }

    #[test]
    fn test_zero_scalar_rejected() {
        let result = KeyPair::from_secret_key(&[0u8; 32]);
        assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));
    }

    #[test]
    fn test_public_key_base64_round_trip() {
        let keypair = KeyPair::generate().unwrap();
        let pk = *keypair.public_key();
        let decoded = PublicKey::from_base64(&pk.to_base64()).unwrap();
        assert_eq!(pk, decoded);
    }

    #[test]
    fn test_public_key_rejects_compressed_point() {
        let keypair = KeyPair::generate().unwrap();
        let mut compressed = keypair.public_key().as_bytes()[..33].to_vec();
        compressed[0] = 0x02;
        assert!(matches!(
            PublicKey::try_from_slice(&compressed),
            Err(CryptoError::InvalidKeyLength { .. })
        ));
    }

    #[test]
    fn test_public_key_rejects_wrong_tag() {
        let keypair = KeyPair::generate().unwrap();
        let mut bytes = *keypair.public_key().as_bytes();
        bytes[0] = 0x05;
        assert!(matches!(
            PublicKey::try_from_slice(&bytes),
            Err(CryptoError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_public_key_rejects_off_curve_point() {
        let keypair = KeyPair::generate().unwrap();
        let mut bytes = *keypair.public_key().as_bytes();
        bytes[64] ^= 0x01;
        assert!(matches!(
            PublicKey::try_from_slice(&bytes),
            Err(CryptoError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let keypair = KeyPair::generate().unwrap();
        let secret_hex = hex::encode(&keypair.secret_key_bytes()[..]);
        let debug = format!("{keypair:?}");
        assert!(!debug.contains(&secret_hex));
        assert!(debug.contains("key_id"));
    }
}
