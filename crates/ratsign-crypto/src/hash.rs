//! Streaming SHA-256 file digests.
//!
//! Files are hashed in bounded chunks so arbitrarily large inputs never
//! have to fit in memory.

use std::fmt;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::error::{CryptoError, CryptoResult};

/// Read buffer size used while hashing (64 KiB).
const CHUNK_SIZE: usize = 65_536;

/// A SHA-256 digest of a file's contents (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileDigest([u8; 32]);

impl FileDigest {
    /// Digest an in-memory buffer.
    #[must_use]
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Digest everything a reader yields.
    ///
    /// # Errors
    ///
    /// Propagates read errors from `reader`.
    pub fn of_reader<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self(hasher.finalize().into()))
    }

    /// Digest a file on disk, streaming it in 64 KiB chunks.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Io`] if the file cannot be opened or read.
    pub async fn of_file(path: &Path) -> CryptoResult<Self> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| CryptoError::io(path, e))?;

        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = file
                .read(&mut buf)
                .await
                .map_err(|e| CryptoError::io(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        let digest = Self(hasher.finalize().into());
        tracing::trace!(path = %path.display(), digest = %digest.to_hex(), "hashed file");
        Ok(digest)
    }

    /// Get the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encode as hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileDigest({})", self.to_hex())
    }
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for FileDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_empty_digest() {
        assert_eq!(FileDigest::of_bytes(b"").to_hex(), EMPTY_SHA256);
    }

    #[test]
    fn test_reader_matches_bytes_across_chunks() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let streamed = FileDigest::of_reader(std::io::Cursor::new(&data)).unwrap();
        assert_eq!(streamed, FileDigest::of_bytes(&data));
    }

    #[tokio::test]
    async fn test_file_digest_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        let data = vec![0xAB; CHUNK_SIZE * 2 + 17];
        std::fs::write(&path, &data).unwrap();

        let digest = FileDigest::of_file(&path).await.unwrap();
        assert_eq!(digest, FileDigest::of_bytes(&data));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileDigest::of_file(&dir.path().join("absent")).await;
        assert!(matches!(result, Err(CryptoError::Io { .. })));
    }
}
