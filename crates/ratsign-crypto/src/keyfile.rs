//! Password-encrypted key files (`*.sec.json`).
//!
//! The private scalar is sealed with AES-256-GCM under a PBKDF2-derived key.
//! The public point is the associated data, so a key file whose public key
//! was swapped no longer decrypts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::codec::{self, MAX_CONTAINER_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::fs;
use crate::kdf::{self, MIN_SALT_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::key_id::KeyId;
use crate::keypair::{KeyPair, PublicKey, SECRET_KEY_LEN};

/// Supported key file format version.
pub const KEY_FILE_VERSION: u32 = 1;

/// Key derivation identifier written to and required in key files.
pub const KDF_ALGORITHM: &str = "PBKDF2-HMAC-SHA256";

/// Cipher identifier written to and required in key files.
pub const CIPHER_ALGORITHM: &str = "AES-256-GCM";

/// Conventional key file suffix.
pub const KEY_FILE_SUFFIX: &str = ".sec.json";

/// Longest salt accepted on load.
const MAX_SALT_LEN: usize = 1024;

/// On-disk JSON layout.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct KeyFileDocument {
    format_version: u32,
    kdf: String,
    cipher: String,
    key_id: String,
    public_key: String,
    salt: String,
    iterations: u32,
    nonce: String,
    ciphertext: String,
    auth_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// A validated, still-encrypted key file.
///
/// Holding a `KeyFile` reveals nothing secret; [`KeyFile::unlock`] with the
/// right password yields the [`KeyPair`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFile {
    public_key: PublicKey,
    key_id: KeyId,
    salt: Vec<u8>,
    iterations: u32,
    nonce: [u8; NONCE_LEN],
    ciphertext: [u8; SECRET_KEY_LEN],
    auth_tag: [u8; TAG_LEN],
    name: Option<String>,
}

impl KeyFile {
    /// Encrypt `keypair` under `password`.
    ///
    /// A fresh salt and nonce are drawn for every call.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidArgument`] for out-of-range
    /// `iterations` and [`CryptoError::RandomnessUnavailable`] if the OS
    /// random source fails.
    pub async fn seal(
        keypair: &KeyPair,
        password: &str,
        iterations: u32,
        name: Option<String>,
    ) -> CryptoResult<Self> {
        kdf::check_iterations(iterations)?;
        let salt = kdf::random_bytes::<SALT_LEN>()?;
        let nonce = kdf::random_bytes::<NONCE_LEN>()?;

        let key = kdf::derive_key_blocking(password.as_bytes(), &salt, iterations).await?;
        let public_key = *keypair.public_key();
        let secret = keypair.secret_key_bytes();
        let sealed = kdf::encrypt(&key, &nonce, &secret[..], public_key.as_bytes())?;

        let mut ciphertext = [0u8; SECRET_KEY_LEN];
        ciphertext.copy_from_slice(&sealed.ciphertext);

        debug!(key_id = %keypair.key_id(), iterations, "sealed private key");
        Ok(Self {
            public_key,
            key_id: keypair.key_id(),
            salt: salt.to_vec(),
            iterations,
            nonce,
            ciphertext,
            auth_tag: sealed.tag,
            name,
        })
    }

    /// Decrypt the private key with `password`.
    ///
    /// This is the only password check. The decrypted scalar must
    /// reproduce the stored public key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::AuthenticationFailure`] on a wrong password or
    /// any tampering of the sealed fields.
    pub async fn unlock(&self, password: &str) -> CryptoResult<KeyPair> {
        let key =
            kdf::derive_key_blocking(password.as_bytes(), &self.salt, self.iterations).await?;
        let scalar: Zeroizing<Vec<u8>> = kdf::decrypt(
            &key,
            &self.nonce,
            &self.ciphertext,
            &self.auth_tag,
            self.public_key.as_bytes(),
        )?;

        let keypair = KeyPair::from_secret_key(&scalar)
            .map_err(|_| CryptoError::AuthenticationFailure)?;
        if keypair.public_key() != &self.public_key {
            return Err(CryptoError::AuthenticationFailure);
        }

        debug!(key_id = %self.key_id, "unlocked private key");
        Ok(keypair)
    }

    /// Parse and validate key file JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyFileMalformed`] for unsupported versions or
    /// algorithms, unknown fields, bad encodings, out-of-range parameters,
    /// or a `keyId` that does not match `publicKey`.
    pub fn from_json(bytes: &[u8]) -> CryptoResult<Self> {
        let doc: KeyFileDocument = codec::from_json(bytes, CryptoError::KeyFileMalformed)?;
        Self::try_from(doc)
    }

    /// Serialize as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidArgument`] if serialization fails.
    pub fn to_json(&self) -> CryptoResult<Vec<u8>> {
        codec::to_json(&KeyFileDocument::from(self))
    }

    /// Read and validate a key file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Io`] if the file cannot be read and
    /// [`CryptoError::KeyFileMalformed`] if it is invalid.
    pub async fn load(path: &Path) -> CryptoResult<Self> {
        let bytes = fs::read_limited(path, MAX_CONTAINER_SIZE, CryptoError::KeyFileMalformed).await?;
        let key_file = Self::from_json(&bytes)?;
        info!(path = %path.display(), key_id = %key_file.key_id, "loaded key file");
        Ok(key_file)
    }

    /// Load a key file and unlock it in one step.
    ///
    /// # Errors
    ///
    /// See [`KeyFile::load`] and [`KeyFile::unlock`].
    pub async fn open(path: &Path, password: &str) -> CryptoResult<KeyPair> {
        Self::load(path).await?.unlock(password).await
    }

    /// Public key stored in the file.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Key id of the stored public key.
    #[must_use]
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// PBKDF2 iteration count.
    #[must_use]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Optional human-readable name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

fn malformed(msg: impl Into<String>) -> CryptoError {
    CryptoError::KeyFileMalformed(msg.into())
}

fn decode_field<const N: usize>(field: &str, value: &str) -> CryptoResult<[u8; N]> {
    codec::decode_base64_array::<N>(value).map_err(|e| malformed(format!("{field}: {e}")))
}

impl TryFrom<KeyFileDocument> for KeyFile {
    type Error = CryptoError;

    fn try_from(doc: KeyFileDocument) -> CryptoResult<Self> {
        if doc.format_version != KEY_FILE_VERSION {
            return Err(malformed(format!(
                "unsupported format version {}",
                doc.format_version
            )));
        }
        if doc.kdf != KDF_ALGORITHM {
            return Err(malformed(format!("unsupported kdf {:?}", doc.kdf)));
        }
        if doc.cipher != CIPHER_ALGORITHM {
            return Err(malformed(format!("unsupported cipher {:?}", doc.cipher)));
        }
        kdf::check_iterations(doc.iterations).map_err(|e| malformed(e.to_string()))?;

        let public_key = PublicKey::from_base64(&doc.public_key)
            .map_err(|e| malformed(format!("publicKey: {e}")))?;
        let key_id =
            KeyId::from_base64(&doc.key_id).map_err(|e| malformed(format!("keyId: {e}")))?;
        if key_id != public_key.key_id() {
            return Err(malformed("keyId does not match publicKey"));
        }

        let salt = codec::decode_base64(&doc.salt).map_err(|e| malformed(format!("salt: {e}")))?;
        if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&salt.len()) {
            return Err(malformed(format!(
                "salt must be {MIN_SALT_LEN} to {MAX_SALT_LEN} bytes, got {}",
                salt.len()
            )));
        }

        Ok(Self {
            public_key,
            key_id,
            salt,
            iterations: doc.iterations,
            nonce: decode_field("nonce", &doc.nonce)?,
            ciphertext: decode_field("ciphertext", &doc.ciphertext)?,
            auth_tag: decode_field("authTag", &doc.auth_tag)?,
            name: doc.name,
        })
    }
}

impl From<&KeyFile> for KeyFileDocument {
    fn from(key_file: &KeyFile) -> Self {
        Self {
            format_version: KEY_FILE_VERSION,
            kdf: KDF_ALGORITHM.to_owned(),
            cipher: CIPHER_ALGORITHM.to_owned(),
            key_id: key_file.key_id.to_base64(),
            public_key: key_file.public_key.to_base64(),
            salt: codec::encode_base64(&key_file.salt),
            iterations: key_file.iterations,
            nonce: codec::encode_base64(&key_file.nonce),
            ciphertext: codec::encode_base64(&key_file.ciphertext),
            auth_tag: codec::encode_base64(&key_file.auth_tag),
            name: key_file.name.clone(),
        }
    }
}
