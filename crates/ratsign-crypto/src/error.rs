//! Cryptographic error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during key generation, signing and verification.
///
/// A signature that simply does not validate is *not* an error: the
/// verifier reports it as `false`. Errors mean the operation could not be
/// carried out at all.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Missing, contradictory or out-of-policy input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The key file has an unsupported version or a corrupt structure.
    #[error("key file malformed: {0}")]
    KeyFileMalformed(String),

    /// Wrong password or tampered key file (the GCM tag did not verify).
    #[error("authentication failed: wrong password or tampered key file")]
    AuthenticationFailure,

    /// The signature file has an unsupported version or a corrupt structure.
    #[error("signature file malformed: {0}")]
    SignatureFileMalformed(String),

    /// The trusted key id does not match the public key embedded in the
    /// signature file.
    #[error("key id does not match the signature's public key")]
    KeyMismatch,

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Invalid public key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid base64 encoding.
    #[error("invalid base64 encoding")]
    InvalidBase64Encoding,

    /// The operating system could not supply random bytes.
    #[error("randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    /// Underlying storage error.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path that was being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A blocking worker (key derivation) panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl CryptoError {
    /// Wrap an I/O error with the path it occurred on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
