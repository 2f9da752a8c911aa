//! Configuration types for ratsign.
//!
//! Every struct implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a bare `[section]` header in TOML produces a working
//! configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key generation defaults.
    pub keygen: KeygenSection,
    /// Signing defaults.
    pub sign: SignSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// KeygenSection
// ---------------------------------------------------------------------------

/// Defaults for `ratsign keygen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeygenSection {
    /// PBKDF2 iteration count for new key files.
    pub iterations: u32,
    /// Directory new key files are written to.
    pub output_dir: String,
}

impl Default for KeygenSection {
    fn default() -> Self {
        Self {
            iterations: 300_000,
            output_dir: ".".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// SignSection
// ---------------------------------------------------------------------------

/// Defaults for `ratsign sign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignSection {
    /// Extension (without the dot) appended to the signed file's name when
    /// no explicit output path is given.
    pub extension: String,
}

impl Default for SignSection {
    fn default() -> Self {
        Self {
            extension: "ratsig".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"` (human-friendly), `"compact"` (one-line),
    /// `"json"` (structured), or `"full"` (verbose).
    pub format: String,
    /// Per-crate tracing directives (e.g. `["ratsign_crypto=debug"]`).
    pub directives: Vec<String>,
    /// Where logs go: `"stderr"`, `"stdout"`, or `"file"`.
    pub target: String,
    /// Log directory when `target = "file"`.
    pub directory: String,
    /// File rotation when `target = "file"`: `"daily"`, `"hourly"`, or
    /// `"never"`.
    pub rotation: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            target: "stderr".to_owned(),
            directory: String::new(),
            rotation: "daily".to_owned(),
        }
    }
}
