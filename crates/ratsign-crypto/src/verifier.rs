//! Signature verification against a caller-supplied trust anchor.
//!
//! The public key embedded in a signature file is only ever used to check
//! it against a [`TrustAnchor::KeyId`]. It is never trusted on its own.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{CryptoError, CryptoResult};
use crate::hash::FileDigest;
use crate::key_id::KeyId;
use crate::keypair::PublicKey;
use crate::message::SigningMessage;
use crate::sigfile::SignatureFile;

/// What the verifier trusts.
///
/// ```
/// use ratsign_crypto::{KeyPair, TrustAnchor};
///
/// let keypair = KeyPair::generate().unwrap();
/// let by_key = TrustAnchor::PublicKey(*keypair.public_key());
/// let by_id = TrustAnchor::KeyId(keypair.key_id());
/// assert_eq!(by_key.key_id(), by_id.key_id());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustAnchor {
    /// A trusted public key. Authoritative; the embedded key is ignored.
    PublicKey(PublicKey),
    /// A trusted key id. The embedded key must hash to it.
    KeyId(KeyId),
}

impl TrustAnchor {
    /// Parse a Base64 public key anchor.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid uncompressed P-256 point.
    pub fn from_public_key_base64(s: &str) -> CryptoResult<Self> {
        PublicKey::from_base64(s).map(Self::PublicKey)
    }

    /// Parse a Base64 key id anchor.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not decode to 32 bytes.
    pub fn from_key_id_base64(s: &str) -> CryptoResult<Self> {
        KeyId::from_base64(s).map(Self::KeyId)
    }

    /// Key id this anchor trusts.
    #[must_use]
    pub fn key_id(&self) -> KeyId {
        match self {
            Self::PublicKey(pk) => pk.key_id(),
            Self::KeyId(id) => *id,
        }
    }

    /// Decide which public key to verify `signature` with.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyMismatch`] when a key id anchor does not
    /// match the embedded key.
    pub fn resolve(&self, signature: &SignatureFile) -> CryptoResult<PublicKey> {
        let embedded = signature.embedded_public_key();
        match self {
            Self::PublicKey(trusted) => {
                if trusted != embedded {
                    debug!(
                        trusted = %trusted.key_id(),
                        embedded = %embedded.key_id(),
                        "embedded public key differs from trusted key"
                    );
                }
                Ok(*trusted)
            },
            Self::KeyId(trusted) if embedded.key_id() == *trusted => Ok(*embedded),
            Self::KeyId(_) => Err(CryptoError::KeyMismatch),
        }
    }
}

/// Outcome of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Verification {
    /// The signature is valid for the file, comment and trusted key.
    Valid,
    /// The signature file's key does not hash to the trusted key id.
    /// No ECDSA check was attempted.
    KeyMismatch,
    /// The signature does not verify (tampered file, comment or signature,
    /// or a different key).
    BadSignature,
}

impl Verification {
    /// Whether the signature was accepted.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

/// Verify a parsed signature against a file digest.
pub fn verify_digest(
    digest: &FileDigest,
    signature_file: &SignatureFile,
    anchor: &TrustAnchor,
) -> Verification {
    let Ok(public_key) = anchor.resolve(signature_file) else {
        return Verification::KeyMismatch;
    };
    check(digest, signature_file, &public_key)
}

fn check(
    digest: &FileDigest,
    signature_file: &SignatureFile,
    public_key: &PublicKey,
) -> Verification {
    let Ok(signature) = signature_file.signature() else {
        debug!("signature is not valid DER");
        return Verification::BadSignature;
    };
    let message = SigningMessage::new(digest, signature_file.comment());
    if public_key.verify(message.as_bytes(), &signature) {
        Verification::Valid
    } else {
        Verification::BadSignature
    }
}

/// Verify `file` against the signature file at `signature_path`.
///
/// # Errors
///
/// Returns [`CryptoError::Io`] if either file cannot be read and
/// [`CryptoError::SignatureFileMalformed`] if the signature file is
/// invalid. A signature that does not verify is not an error.
pub async fn verify_file(
    file: &Path,
    signature_path: &Path,
    anchor: &TrustAnchor,
) -> CryptoResult<Verification> {
    let signature_file = SignatureFile::load(signature_path).await?;
    verify_signature_file(file, &signature_file, anchor).await
}

/// Verify `file` against an already loaded signature file.
///
/// Trust is resolved before the file is hashed, so a key id mismatch is
/// reported without reading `file`.
///
/// # Errors
///
/// Returns [`CryptoError::Io`] if `file` cannot be read.
pub async fn verify_signature_file(
    file: &Path,
    signature_file: &SignatureFile,
    anchor: &TrustAnchor,
) -> CryptoResult<Verification> {
    let public_key = match anchor.resolve(signature_file) {
        Ok(public_key) => public_key,
        Err(CryptoError::KeyMismatch) => {
            warn!(
                trusted = %anchor.key_id(),
                embedded = %signature_file.embedded_key_id(),
                "signature key does not match trusted key id"
            );
            return Ok(Verification::KeyMismatch);
        },
        Err(e) => return Err(e),
    };

    let digest = FileDigest::of_file(file).await?;
    let outcome = check(&digest, signature_file, &public_key);
    debug!(
        file = %file.display(),
        key_id = %public_key.key_id(),
        ?outcome,
        "verified file"
    );
    Ok(outcome)
}

/// Verify with a trusted Base64 public key.
///
/// # Errors
///
/// Malformed trust input is an error, not `false`. Otherwise as
/// [`verify_file`].
pub async fn verify_file_with_public_key(
    file: &Path,
    signature_path: &Path,
    trusted_public_key: &str,
) -> CryptoResult<bool> {
    let anchor = TrustAnchor::from_public_key_base64(trusted_public_key)?;
    Ok(verify_file(file, signature_path, &anchor).await?.is_valid())
}

/// Verify with a trusted Base64 key id.
///
/// # Errors
///
/// Malformed trust input is an error, not `false`. Otherwise as
/// [`verify_file`].
pub async fn verify_file_with_key_id(
    file: &Path,
    signature_path: &Path,
    trusted_key_id: &str,
) -> CryptoResult<bool> {
    let anchor = TrustAnchor::from_key_id_base64(trusted_key_id)?;
    Ok(verify_file(file, signature_path, &anchor).await?.is_valid())
}
