//! Key generation and key file emission.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{CryptoError, CryptoResult};
use crate::fs::{self, WriteMode};
use crate::kdf::{self, DEFAULT_ITERATIONS};
use crate::key_id::KeyId;
use crate::keyfile::{KEY_FILE_SUFFIX, KeyFile};
use crate::keypair::KeyPair;

/// Prefix of automatically derived key file names.
const DEFAULT_NAME_PREFIX: &str = "ratsign_";

/// Generates a key pair and writes it as an encrypted key file.
///
/// ```rust,no_run
/// # async fn demo() -> ratsign_crypto::CryptoResult<()> {
/// use ratsign_crypto::keygen::KeyGenerator;
///
/// let path = KeyGenerator::new()
///     .iterations(500_000)
///     .name("release")
///     .generate(std::path::Path::new("."), "hunter2")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    iterations: u32,
    name: Option<String>,
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator {
    /// Generator with the default iteration count and an automatic name.
    #[must_use]
    pub fn new() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            name: None,
        }
    }

    /// Set the PBKDF2 iteration count.
    #[must_use]
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the key file base name (`<name>.sec.json`).
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Generate a key pair, seal it under `password` and write the key file
    /// into `output_dir`.
    ///
    /// The file is created atomically and never overwrites an existing
    /// one. Any password is accepted, including the empty string. Returns
    /// the path written.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidArgument`] for out-of-range iterations, a
    ///   bad name, a missing output directory or an existing destination
    /// - [`CryptoError::RandomnessUnavailable`] if the OS random source fails
    /// - [`CryptoError::Io`] if the file cannot be written
    pub async fn generate(&self, output_dir: &Path, password: &str) -> CryptoResult<PathBuf> {
        kdf::check_iterations(self.iterations)?;
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        check_output_dir(output_dir).await?;

        let keypair = KeyPair::generate()?;
        let key_id = keypair.key_id();
        let path = output_dir.join(key_file_name(&key_id, self.name.as_deref())?);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(CryptoError::InvalidArgument(format!(
                "refusing to overwrite existing key file {}",
                path.display()
            )));
        }

        let key_file = KeyFile::seal(&keypair, password, self.iterations, self.name.clone()).await?;
        let path = fs::write_atomic(&path, key_file.to_json()?, WriteMode::CreateNew, true).await?;

        info!(path = %path.display(), key_id = %key_id, iterations = self.iterations, "generated key file");
        Ok(path)
    }
}

/// Generate a key file with explicit options.
///
/// # Errors
///
/// See [`KeyGenerator::generate`].
pub async fn generate(
    output_dir: &Path,
    password: &str,
    iterations: u32,
    name: Option<&str>,
) -> CryptoResult<PathBuf> {
    let mut generator = KeyGenerator::new().iterations(iterations);
    if let Some(name) = name {
        generator = generator.name(name);
    }
    generator.generate(output_dir, password).await
}

/// File name for a key file: `<name>.sec.json`, or
/// `ratsign_<first 4 key id bytes as hex>.sec.json` when no name is given.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidArgument`] if `name` is not a plain file
/// name.
pub fn key_file_name(key_id: &KeyId, name: Option<&str>) -> CryptoResult<String> {
    match name {
        Some(name) => {
            validate_name(name)?;
            Ok(format!("{name}{KEY_FILE_SUFFIX}"))
        },
        None => Ok(format!(
            "{DEFAULT_NAME_PREFIX}{}{KEY_FILE_SUFFIX}",
            key_id.short_hex()
        )),
    }
}

fn validate_name(name: &str) -> CryptoResult<()> {
    let reason = if name.trim().is_empty() {
        Some("must not be empty")
    } else if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if name.contains("..") {
        Some("must not contain '..'")
    } else if name.chars().any(char::is_control) {
        Some("must not contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CryptoError::InvalidArgument(format!(
            "key name {name:?} {reason}"
        ))),
        None => Ok(()),
    }
}

async fn check_output_dir(dir: &Path) -> CryptoResult<()> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(CryptoError::InvalidArgument(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CryptoError::InvalidArgument(
            format!("output directory {} does not exist", dir.display()),
        )),
        Err(e) => Err(CryptoError::io(dir, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::MIN_ITERATIONS;

    #[tokio::test]
    async fn test_generate_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "pw", MIN_ITERATIONS, None)
            .await
            .unwrap();

        let key_file = KeyFile::load(&path).await.unwrap();
        let expected = format!("ratsign_{}.sec.json", key_file.key_id().short_hex());
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), expected);
        assert_eq!(key_file.iterations(), MIN_ITERATIONS);
        assert!(key_file.unlock("pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_generate_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = KeyGenerator::new()
            .iterations(MIN_ITERATIONS)
            .name("release")
            .generate(dir.path(), "pw")
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("release.sec.json"));
        assert_eq!(KeyFile::load(&path).await.unwrap().name(), Some("release"));
    }

    #[tokio::test]
    async fn test_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("release.sec.json");
        std::fs::write(&existing, b"keep me").unwrap();

        let result = generate(dir.path(), "pw", MIN_ITERATIONS, Some("release")).await;
        assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));
        assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn test_rejects_low_iterations() {
        let dir = tempfile::tempdir().unwrap();
        let result = generate(dir.path(), "pw", MIN_ITERATIONS - 1, None).await;
        assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = generate(&dir.path().join("nope"), "pw", MIN_ITERATIONS, None).await;
        assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_empty_password_signs_and_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let key = generate(dir.path(), "", MIN_ITERATIONS, None).await.unwrap();
        let file = dir.path().join("payload.bin");
        std::fs::write(&file, b"payload").unwrap();

        let sig = crate::signer::sign_file(&file, &key, "", None, Some("c"))
            .await
            .unwrap();
        let key_file = KeyFile::load(&key).await.unwrap();
        let anchor = crate::TrustAnchor::PublicKey(*key_file.public_key());
        let outcome = crate::verifier::verify_file(&file, &sig, &anchor)
            .await
            .unwrap();
        assert!(outcome.is_valid());

        // The empty password is a real password, not a wildcard.
        assert!(matches!(
            key_file.unlock("pw").await,
            Err(CryptoError::AuthenticationFailure)
        ));
    }

    #[test]
    fn test_name_validation() {
        for bad in ["", "  ", "../evil", "a/b", "a\\b", "x..y", "tab\there"] {
            assert!(validate_name(bad).is_err(), "{bad:?} accepted");
        }
        for good in ["release", "ratsign_2025", "my key"] {
            assert!(validate_name(good).is_ok(), "{good:?} rejected");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_key_file_mode_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "pw", MIN_ITERATIONS, None)
            .await
            .unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
