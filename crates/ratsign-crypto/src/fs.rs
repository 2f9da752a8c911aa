//! Bounded reads and atomic writes for key and signature containers.

use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;

use crate::error::{CryptoError, CryptoResult};

/// How [`write_atomic`] treats an existing destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// Fail if the destination exists (key files).
    CreateNew,
    /// Atomically replace the destination (signature files).
    Replace,
}

/// Read at most `limit` bytes from `path`.
///
/// Oversize files are reported through `malformed` without being read in
/// full.
pub(crate) async fn read_limited(
    path: &Path,
    limit: usize,
    malformed: fn(String) -> CryptoError,
) -> CryptoResult<Vec<u8>> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| CryptoError::io(path, e))?;

    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut buf = Vec::new();
    file.take(cap)
        .read_to_end(&mut buf)
        .await
        .map_err(|e| CryptoError::io(path, e))?;

    if buf.len() > limit {
        return Err(malformed(format!(
            "{} exceeds the {limit} byte limit",
            path.display()
        )));
    }
    Ok(buf)
}

/// Write `contents` to `path` through a temporary file in the same
/// directory, then rename it into place.
///
/// A failed write never leaves a partial destination behind. `secret`
/// files keep the owner-only mode the temporary file is created with;
/// others are widened to `0644` on Unix.
pub(crate) async fn write_atomic(
    path: &Path,
    contents: Vec<u8>,
    mode: WriteMode,
    secret: bool,
) -> CryptoResult<PathBuf> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &contents, mode, secret))
        .await
        .map_err(|e| CryptoError::Task(e.to_string()))?
}

fn write_atomic_blocking(
    path: &Path,
    contents: &[u8],
    mode: WriteMode,
    secret: bool,
) -> CryptoResult<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".ratsign-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| CryptoError::io(dir, e))?;

    #[cfg(unix)]
    if !secret {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| CryptoError::io(tmp.path(), e))?;
    }
    #[cfg(not(unix))]
    let _ = secret;

    tmp.write_all(contents)
        .map_err(|e| CryptoError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CryptoError::io(tmp.path(), e))?;

    let persisted = match mode {
        WriteMode::CreateNew => tmp.persist_noclobber(path),
        WriteMode::Replace => tmp.persist(path),
    };
    persisted.map_err(|e| CryptoError::io(path, e.error))?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(path.to_path_buf())
}
