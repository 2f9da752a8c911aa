//! Detached signature files (`*.ratsig`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::{self, MAX_CONTAINER_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::fs;
use crate::key_id::KeyId;
use crate::keypair::PublicKey;
use crate::signature::Signature;

/// Supported signature file format version.
pub const SIGNATURE_FILE_VERSION: u32 = 1;

/// Signature algorithm identifier written to and required in signature files.
pub const SIGNATURE_ALGORITHM: &str = "ECDSA-P256-SHA256";

/// Default signature file extension (without the dot).
pub const SIGNATURE_EXTENSION: &str = "ratsig";

/// Longest trusted comment accepted for signing, in UTF-8 bytes.
///
/// JSON escaping grows a comment by at most six times, so a signature file
/// carrying the longest comment still loads under
/// [`MAX_CONTAINER_SIZE`].
pub const MAX_COMMENT_LEN: usize = 8192;

/// Reject a trusted comment longer than [`MAX_COMMENT_LEN`] bytes.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidArgument`] if the comment is too long.
pub fn check_comment(comment: Option<&str>) -> CryptoResult<()> {
    match comment {
        Some(c) if c.len() > MAX_COMMENT_LEN => Err(CryptoError::InvalidArgument(format!(
            "comment is {} bytes, the limit is {MAX_COMMENT_LEN}",
            c.len()
        ))),
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SignatureFileDocument {
    format_version: u32,
    algorithm: String,
    public_key: String,
    key_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    signature: String,
}

/// A parsed signature file.
///
/// The embedded public key and key id are advisory: verification only
/// trusts the anchor supplied by the caller. They must still be well formed;
/// an embedded key that is not a valid P-256 point makes the whole file
/// [`CryptoError::SignatureFileMalformed`], whichever anchor is used.
///
/// The signature itself is kept as raw DER so that a corrupted signature is
/// a failed verification rather than a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureFile {
    public_key: PublicKey,
    key_id: KeyId,
    comment: Option<String>,
    signature: Vec<u8>,
}

impl SignatureFile {
    /// Assemble a signature file for `signature`, made by `public_key`.
    #[must_use]
    pub fn new(public_key: PublicKey, signature: &Signature, comment: Option<String>) -> Self {
        Self {
            key_id: public_key.key_id(),
            public_key,
            comment,
            signature: signature.to_der(),
        }
    }

    /// Parse and validate signature file JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::SignatureFileMalformed`] for unsupported
    /// versions or algorithms, unknown fields or bad encodings.
    pub fn from_json(bytes: &[u8]) -> CryptoResult<Self> {
        let doc: SignatureFileDocument =
            codec::from_json(bytes, CryptoError::SignatureFileMalformed)?;
        Self::try_from(doc)
    }

    /// Serialize as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidArgument`] if serialization fails.
    pub fn to_json(&self) -> CryptoResult<Vec<u8>> {
        codec::to_json(&SignatureFileDocument::from(self))
    }

    /// Read and validate a signature file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Io`] if the file cannot be read and
    /// [`CryptoError::SignatureFileMalformed`] if it is invalid.
    pub async fn load(path: &Path) -> CryptoResult<Self> {
        let bytes =
            fs::read_limited(path, MAX_CONTAINER_SIZE, CryptoError::SignatureFileMalformed).await?;
        Self::from_json(&bytes)
    }

    /// Write the signature file, atomically replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Io`] if the file cannot be written.
    pub async fn save(&self, path: &Path) -> CryptoResult<PathBuf> {
        fs::write_atomic(path, self.to_json()?, fs::WriteMode::Replace, false).await
    }

    /// The public key embedded by the signer. Not a trust anchor.
    #[must_use]
    pub fn embedded_public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The key id embedded by the signer.
    #[must_use]
    pub fn embedded_key_id(&self) -> KeyId {
        self.key_id
    }

    /// The trusted comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Decode the DER signature.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidArgument`] if the DER is invalid.
    pub fn signature(&self) -> CryptoResult<Signature> {
        Signature::from_der(&self.signature)
    }

    /// `<file>.ratsig`, keeping the original extension.
    #[must_use]
    pub fn default_path_for(file: &Path) -> PathBuf {
        Self::path_with_extension(file, SIGNATURE_EXTENSION)
    }

    /// `<file>.<extension>`, keeping the original extension.
    #[must_use]
    pub fn path_with_extension(file: &Path, extension: &str) -> PathBuf {
        let mut name = OsString::from(file.as_os_str());
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}

fn malformed(msg: impl Into<String>) -> CryptoError {
    CryptoError::SignatureFileMalformed(msg.into())
}

impl TryFrom<SignatureFileDocument> for SignatureFile {
    type Error = CryptoError;

    fn try_from(doc: SignatureFileDocument) -> CryptoResult<Self> {
        if doc.format_version != SIGNATURE_FILE_VERSION {
            return Err(malformed(format!(
                "unsupported format version {}",
                doc.format_version
            )));
        }
        if doc.algorithm != SIGNATURE_ALGORITHM {
            return Err(malformed(format!(
                "unsupported algorithm {:?}",
                doc.algorithm
            )));
        }

        let public_key = PublicKey::from_base64(&doc.public_key)
            .map_err(|e| malformed(format!("publicKey: {e}")))?;
        let key_id =
            KeyId::from_base64(&doc.key_id).map_err(|e| malformed(format!("keyId: {e}")))?;
        let signature = codec::decode_base64(&doc.signature)
            .map_err(|e| malformed(format!("signature: {e}")))?;
        if signature.is_empty() {
            return Err(malformed("signature is empty"));
        }

        Ok(Self {
            public_key,
            key_id,
            comment: doc.comment,
            signature,
        })
    }
}

impl From<&SignatureFile> for SignatureFileDocument {
    fn from(sig: &SignatureFile) -> Self {
        Self {
            format_version: SIGNATURE_FILE_VERSION,
            algorithm: SIGNATURE_ALGORITHM.to_owned(),
            public_key: sig.public_key.to_base64(),
            key_id: sig.key_id.to_base64(),
            comment: sig.comment.clone(),
            signature: codec::encode_base64(&sig.signature),
        }
    }
}
