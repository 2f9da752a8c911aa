//! Prelude module - commonly used types for convenient import.
//!
//! Use `use ratsign_crypto::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use ratsign_crypto::prelude::*;
//!
//! let keypair = KeyPair::generate().unwrap();
//! let signer = Signer::new(keypair);
//!
//! let digest = FileDigest::of_bytes(b"hello");
//! let signature_file = signer.sign_digest(&digest, Some("release:1")).unwrap();
//!
//! let anchor = TrustAnchor::KeyId(signer.key_id());
//! assert!(verify_digest(&digest, &signature_file, &anchor).is_valid());
//! ```

// Errors
pub use crate::{CryptoError, CryptoResult};

// Key types
pub use crate::{KeyFile, KeyId, KeyPair, PublicKey};

// Signing
pub use crate::{Signature, SignatureFile, Signer, SigningMessage};

// Verification
pub use crate::verifier::verify_digest;
pub use crate::{TrustAnchor, Verification};

// Hashing
pub use crate::FileDigest;
