//! Password-based key derivation and authenticated encryption of the
//! private scalar.
//!
//! PBKDF2-HMAC-SHA256 stretches the password into a 256-bit key, which
//! seals the scalar with AES-256-GCM. The tag is stored detached from the
//! ciphertext so each field of the key file has a fixed length.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{CryptoError, CryptoResult};

/// Lowest accepted PBKDF2 iteration count.
pub const MIN_ITERATIONS: u32 = 10_000;

/// Highest accepted PBKDF2 iteration count.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Iteration count used when the caller does not choose one.
pub const DEFAULT_ITERATIONS: u32 = 300_000;

/// Salt length written by key generation.
pub const SALT_LEN: usize = 32;

/// Shortest salt accepted when loading a key file.
pub const MIN_SALT_LEN: usize = 16;

/// AES-GCM nonce length.
pub const NONCE_LEN: usize = 12;

/// AES-GCM tag length.
pub const TAG_LEN: usize = 16;

/// Derived key length (AES-256).
pub const KEY_LEN: usize = 32;

/// A derived AES-256 key. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Output of [`encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Detached authentication tag.
    pub tag: [u8; TAG_LEN],
}

/// Check an iteration count against the accepted range.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidArgument`] if `iterations` is outside
/// `[MIN_ITERATIONS, MAX_ITERATIONS]`.
pub fn check_iterations(iterations: u32) -> CryptoResult<()> {
    if (MIN_ITERATIONS..=MAX_ITERATIONS).contains(&iterations) {
        Ok(())
    } else {
        Err(CryptoError::InvalidArgument(format!(
            "iterations must be between {MIN_ITERATIONS} and {MAX_ITERATIONS}, got {iterations}"
        )))
    }
}

/// Derive a 256-bit key with PBKDF2-HMAC-SHA256.
///
/// Deterministic for a given `(password, salt, iterations)`; cost grows
/// linearly with `iterations`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidArgument`] if `iterations` is out of range.
pub fn derive_key(password: &[u8], salt: &[u8], iterations: u32) -> CryptoResult<SymmetricKey> {
    check_iterations(iterations)?;
    Ok(pbkdf2_sha256(password, salt, iterations))
}

/// [`derive_key`] on a blocking worker thread.
///
/// # Errors
///
/// As [`derive_key`], plus [`CryptoError::Task`] if the worker fails.
pub async fn derive_key_blocking(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> CryptoResult<SymmetricKey> {
    check_iterations(iterations)?;
    let password = Zeroizing::new(password.to_vec());
    let salt = salt.to_vec();
    tokio::task::spawn_blocking(move || pbkdf2_sha256(&password, &salt, iterations))
        .await
        .map_err(|e| CryptoError::Task(e.to_string()))
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> SymmetricKey {
    let mut key = SymmetricKey([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key.0);
    key
}

/// Fill an array from the OS random source.
///
/// # Errors
///
/// Returns [`CryptoError::RandomnessUnavailable`] if the OS cannot supply
/// random bytes.
pub fn random_bytes<const N: usize>() -> CryptoResult<[u8; N]> {
    let mut out = [0u8; N];
    OsRng
        .try_fill_bytes(&mut out)
        .map_err(|e| CryptoError::RandomnessUnavailable(e.to_string()))?;
    Ok(out)
}

/// Encrypt `plaintext` with AES-256-GCM, authenticating `aad` alongside.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidArgument`] if the plaintext exceeds the
/// AES-GCM length limit.
pub fn encrypt(
    key: &SymmetricKey,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
    aad: &[u8],
) -> CryptoResult<Sealed> {
    let mut buffer = plaintext.to_vec();
    let tag = key
        .cipher()
        .encrypt_in_place_detached(Nonce::from_slice(nonce), aad, &mut buffer)
        .map_err(|_| {
            buffer.zeroize();
            CryptoError::InvalidArgument("plaintext too long for AES-GCM".to_owned())
        })?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);
    Ok(Sealed {
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Decrypt and authenticate a sealed payload.
///
/// Fails closed: on tag mismatch the partially decrypted buffer is wiped
/// and nothing is returned.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailure`] if the key, nonce,
/// ciphertext, tag or `aad` do not match what was sealed.
pub fn decrypt(
    key: &SymmetricKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
    aad: &[u8],
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    key.cipher()
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            aad,
            buffer.as_mut_slice(),
            Tag::from_slice(tag),
        )
        .map_err(|_| CryptoError::AuthenticationFailure)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: [u8; SALT_LEN] = [0x42; SALT_LEN];
    const NONCE: [u8; NONCE_LEN] = [0x07; NONCE_LEN];

    fn key(password: &[u8]) -> SymmetricKey {
        derive_key(password, &SALT, MIN_ITERATIONS).unwrap()
    }

    #[test]
    fn test_pbkdf2_known_vector() {
        // PBKDF2-HMAC-SHA256("password", "salt", 1, 32)
        let derived = pbkdf2_sha256(b"password", b"salt", 1);
        assert_eq!(
            hex::encode(derived.0),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
    }

    #[test]
    fn test_derive_key_deterministic() {
        assert_eq!(key(b"pw").0, key(b"pw").0);
        assert_ne!(key(b"pw").0, key(b"other").0);
    }

    #[test]
    fn test_iteration_bounds() {
        assert!(check_iterations(MIN_ITERATIONS).is_ok());
        assert!(check_iterations(MAX_ITERATIONS).is_ok());
        assert!(matches!(
            check_iterations(MIN_ITERATIONS - 1),
            Err(CryptoError::InvalidArgument(_))
        ));
        assert!(matches!(
            check_iterations(MAX_ITERATIONS + 1),
            Err(CryptoError::InvalidArgument(_))
        ));
        assert!(derive_key(b"pw", &SALT, 1).is_err());
    }

    #[tokio::test]
    async fn test_blocking_matches_inline() {
        let inline = key(b"pw");
        let blocking = derive_key_blocking(b"pw", &SALT, MIN_ITERATIONS)
            .await
            .unwrap();
        assert_eq!(inline.0, blocking.0);
    }

    #[test]
    fn test_encrypt_decrypt() {
        let k = key(b"pw");
        let sealed = encrypt(&k, &NONCE, &[9u8; 32], b"aad").unwrap();
        assert_eq!(sealed.ciphertext.len(), 32);
        assert_ne!(sealed.ciphertext, vec![9u8; 32]);

        let plain = decrypt(&k, &NONCE, &sealed.ciphertext, &sealed.tag, b"aad").unwrap();
        assert_eq!(plain.as_slice(), &[9u8; 32]);
    }

    #[test]
    fn test_wrong_key_fails_closed() {
        let sealed = encrypt(&key(b"pw"), &NONCE, &[1u8; 32], b"").unwrap();
        let result = decrypt(&key(b"nope"), &NONCE, &sealed.ciphertext, &sealed.tag, b"");
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_any_bit_flip_fails_closed() {
        let k = key(b"pw");
        let sealed = encrypt(&k, &NONCE, &[1u8; 32], b"bound").unwrap();

        for i in 0..sealed.ciphertext.len() {
            let mut ct = sealed.ciphertext.clone();
            ct[i] ^= 0x01;
            assert!(decrypt(&k, &NONCE, &ct, &sealed.tag, b"bound").is_err());
        }
        for i in 0..TAG_LEN {
            let mut tag = sealed.tag;
            tag[i] ^= 0x80;
            assert!(decrypt(&k, &NONCE, &sealed.ciphertext, &tag, b"bound").is_err());
        }

        let mut nonce = NONCE;
        nonce[0] ^= 0x01;
        assert!(decrypt(&k, &nonce, &sealed.ciphertext, &sealed.tag, b"bound").is_err());
        assert!(decrypt(&k, &NONCE, &sealed.ciphertext, &sealed.tag, b"bounD").is_err());
    }

    #[test]
    fn test_random_bytes_unique() {
        let a = random_bytes::<SALT_LEN>().unwrap();
        let b = random_bytes::<SALT_LEN>().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_redacts() {
        assert_eq!(format!("{:?}", key(b"pw")), "SymmetricKey([REDACTED])");
    }
}
