//! Ratsign Crypto - detached file signatures with ECDSA P-256 / SHA-256.
//!
//! This crate provides:
//! - P-256 key pairs, public keys and `KeyId` fingerprints
//! - Password-encrypted key files (PBKDF2-HMAC-SHA256 + AES-256-GCM)
//! - Detached `.ratsig` signature files binding file content and a trusted comment
//! - Verification against an explicit public key or a `KeyId` trust anchor
//!
//! # Trust model
//!
//! The public key embedded in a signature file is never trusted on its own.
//! Verification always starts from a caller-supplied [`TrustAnchor`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use ratsign_crypto::{TrustAnchor, keygen, signer, verifier};
//!
//! # async fn demo() -> ratsign_crypto::CryptoResult<()> {
//! let key_path = keygen::generate(Path::new("."), "hunter2", 300_000, None).await?;
//! let sig_path = signer::sign_file(
//!     Path::new("payload.bin"),
//!     &key_path,
//!     "hunter2",
//!     None,
//!     Some("release:1"),
//! )
//! .await?;
//!
//! let key_file = ratsign_crypto::KeyFile::load(&key_path).await?;
//! let anchor = TrustAnchor::PublicKey(*key_file.public_key());
//! let outcome = verifier::verify_file(Path::new("payload.bin"), &sig_path, &anchor).await?;
//! assert!(outcome.is_valid());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod codec;
pub mod kdf;
pub mod keygen;
pub mod prelude;
pub mod signer;
pub mod verifier;

mod error;
mod fs;
mod hash;
mod key_id;
mod keyfile;
mod keypair;
mod message;
mod sigfile;
mod signature;

pub use error::{CryptoError, CryptoResult};
pub use hash::FileDigest;
pub use key_id::KeyId;
pub use keyfile::{CIPHER_ALGORITHM, KDF_ALGORITHM, KEY_FILE_SUFFIX, KEY_FILE_VERSION, KeyFile};
pub use keypair::{KeyPair, PUBLIC_KEY_LEN, PublicKey, SECRET_KEY_LEN};
pub use message::SigningMessage;
pub use sigfile::{
    MAX_COMMENT_LEN, SIGNATURE_ALGORITHM, SIGNATURE_EXTENSION, SIGNATURE_FILE_VERSION,
    SignatureFile, check_comment,
};
pub use signature::Signature;
pub use signer::Signer;
pub use verifier::{TrustAnchor, Verification};
