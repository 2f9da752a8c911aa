//! ECDSA signature wrapper.

use std::fmt;

use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature as EcdsaSignature, VerifyingKey};

use crate::codec;
use crate::error::{CryptoError, CryptoResult};

/// An ECDSA-P256-SHA256 signature, persisted as DER.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(EcdsaSignature);

impl Signature {
    /// Parse a DER-encoded `(r, s)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidArgument`] if the bytes are not a
    /// valid DER signature with in-range scalars.
    pub fn from_der(der: &[u8]) -> CryptoResult<Self> {
        EcdsaSignature::from_der(der)
            .map(Self)
            .map_err(|_| CryptoError::InvalidArgument("invalid DER signature".to_owned()))
    }

    /// Encode as DER.
    #[must_use]
    pub fn to_der(&self) -> Vec<u8> {
        self.0.to_der().as_bytes().to_vec()
    }

    /// Encode the DER form as Base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        codec::encode_base64(&self.to_der())
    }

    pub(crate) fn verify_with(&self, key: &VerifyingKey, message: &[u8]) -> bool {
        key.verify(message, &self.0).is_ok()
    }
}

impl From<EcdsaSignature> for Signature {
    fn from(sig: EcdsaSignature) -> Self {
        Self(sig)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_base64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyPair;

    #[test]
    fn test_der_round_trip() {
        let keypair = KeyPair::generate().unwrap();
        let sig = keypair.sign(b"message");
        let parsed = Signature::from_der(&sig.to_der()).unwrap();
        assert_eq!(sig, parsed);
        assert!(keypair.public_key().verify(b"message", &parsed));
    }

    #[test]
    fn test_garbage_der_rejected() {
        assert!(matches!(
            Signature::from_der(&[0x30, 0x02, 0x01]),
            Err(CryptoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_der_starts_with_sequence_tag() {
        let sig = KeyPair::generate().unwrap().sign(b"x");
        assert_eq!(sig.to_der()[0], 0x30);
    }
}
