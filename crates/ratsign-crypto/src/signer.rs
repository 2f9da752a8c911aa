//! Signing files with an unlocked key.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::CryptoResult;
use crate::hash::FileDigest;
use crate::key_id::KeyId;
use crate::keyfile::KeyFile;
use crate::keypair::{KeyPair, PublicKey};
use crate::message::SigningMessage;
use crate::sigfile::{self, SignatureFile};

/// Holds a decrypted key pair for signing one or more files.
///
/// Unlocking happens once; every [`Signer::sign_file`] call afterwards is
/// just hashing and ECDSA. The private scalar is wiped when the signer is
/// dropped.
#[derive(Debug)]
pub struct Signer {
    keypair: KeyPair,
}

impl Signer {
    /// Wrap an already decrypted key pair.
    #[must_use]
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Load and decrypt the key file at `key_file_path`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Io`](crate::CryptoError::Io),
    /// [`CryptoError::KeyFileMalformed`](crate::CryptoError::KeyFileMalformed)
    /// or [`CryptoError::AuthenticationFailure`](crate::CryptoError::AuthenticationFailure).
    pub async fn unlock(key_file_path: &Path, password: &str) -> CryptoResult<Self> {
        KeyFile::open(key_file_path, password).await.map(Self::new)
    }

    /// Public key of the signing key.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        self.keypair.public_key()
    }

    /// Key id of the signing key.
    #[must_use]
    pub fn key_id(&self) -> KeyId {
        self.keypair.key_id()
    }

    /// Sign a precomputed file digest.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidArgument`](crate::CryptoError::InvalidArgument)
    /// if `comment` is longer than [`MAX_COMMENT_LEN`](crate::MAX_COMMENT_LEN).
    pub fn sign_digest(
        &self,
        digest: &FileDigest,
        comment: Option<&str>,
    ) -> CryptoResult<SignatureFile> {
        sigfile::check_comment(comment)?;
        let message = SigningMessage::new(digest, comment);
        let signature = self.keypair.sign(message.as_bytes());
        Ok(SignatureFile::new(
            *self.keypair.public_key(),
            &signature,
            comment.map(str::to_owned),
        ))
    }

    /// Sign `file_path` and write the signature file.
    ///
    /// Writes to `out_sig_path`, or `<file_path>.ratsig` when `None`,
    /// replacing any existing signature. Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidArgument`](crate::CryptoError::InvalidArgument)
    /// for an over-long comment and [`CryptoError::Io`](crate::CryptoError::Io)
    /// if the file cannot be read or the signature cannot be written.
    pub async fn sign_file(
        &self,
        file_path: &Path,
        out_sig_path: Option<&Path>,
        comment: Option<&str>,
    ) -> CryptoResult<PathBuf> {
        sigfile::check_comment(comment)?;
        let digest = FileDigest::of_file(file_path).await?;
        let signature_file = self.sign_digest(&digest, comment)?;

        let out = out_sig_path.map_or_else(
            || SignatureFile::default_path_for(file_path),
            Path::to_path_buf,
        );
        let written = signature_file.save(&out).await?;

        info!(
            file = %file_path.display(),
            signature = %written.display(),
            key_id = %self.key_id(),
            "signed file"
        );
        Ok(written)
    }
}

/// Unlock `key_file_path` with `password` and sign `file_path`.
///
/// The comment is checked before the key is unlocked.
///
/// # Errors
///
/// See [`Signer::unlock`] and [`Signer::sign_file`].
pub async fn sign_file(
    file_path: &Path,
    key_file_path: &Path,
    password: &str,
    out_sig_path: Option<&Path>,
    comment: Option<&str>,
) -> CryptoResult<PathBuf> {
    sigfile::check_comment(comment)?;
    Signer::unlock(key_file_path, password)
        .await?
        .sign_file(file_path, out_sig_path, comment)
        .await
}
