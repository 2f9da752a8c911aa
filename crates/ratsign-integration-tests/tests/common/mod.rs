//! Shared fixtures for integration tests.

use std::path::{Path, PathBuf};

use ratsign_crypto::kdf::MIN_ITERATIONS;
use ratsign_crypto::{KeyFile, PublicKey, keygen, signer};
use tempfile::TempDir;

/// Password used for every fixture key.
pub const PASSWORD: &str = "correct horse battery staple";

/// A temp directory holding a key file and a payload.
///
/// Everything is removed when the fixture is dropped.
#[allow(dead_code)]
pub struct Fixture {
    /// Path of the generated key file.
    pub key_path: PathBuf,
    /// Public key of the generated key file.
    pub public_key: PublicKey,
    dir: TempDir,
}

#[allow(dead_code)]
impl Fixture {
    /// Generate a key file with the cheapest allowed iteration count.
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("failed to create tempdir");
        let key_path = keygen::generate(dir.path(), PASSWORD, MIN_ITERATIONS, None)
            .await
            .expect("keygen failed");
        let public_key = *KeyFile::load(&key_path)
            .await
            .expect("key file unreadable")
            .public_key();
        Self {
            key_path,
            public_key,
            dir,
        }
    }

    /// Working directory of this fixture.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` inside the fixture directory.
    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write payload");
        path
    }

    /// Sign `file` with the fixture key, writing `<file>.ratsig`.
    pub async fn sign(&self, file: &Path, comment: Option<&str>) -> PathBuf {
        signer::sign_file(file, &self.key_path, PASSWORD, None, comment)
            .await
            .expect("signing failed")
    }
}

/// Rewrite one string field of a JSON document on disk.
#[allow(dead_code)]
pub fn edit_json(path: &Path, edit: impl FnOnce(&mut serde_json::Map<String, serde_json::Value>)) {
    let bytes = std::fs::read(path).expect("failed to read json");
    let mut value: serde_json::Value = serde_json::from_slice(&bytes).expect("invalid json");
    edit(value.as_object_mut().expect("not a json object"));
    std::fs::write(path, serde_json::to_vec_pretty(&value).expect("serialize"))
        .expect("failed to write json");
}
