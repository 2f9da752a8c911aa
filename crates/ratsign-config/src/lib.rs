#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Layered configuration for the `ratsign` tool.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ratsign_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("keygen iterations: {}", resolved.config.keygen.iterations);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment variables** (`RATSIGN_ITERATIONS`, `RATSIGN_OUTPUT_DIR`,
//!    `RATSIGN_LOG_LEVEL`, `RATSIGN_LOG_FORMAT`, `RATSIGN_LOG_TARGET`,
//!    `RATSIGN_LOG_DIR`, `RATSIGN_LOG_ROTATION`)
//! 2. **Explicit file** (`ratsign --config <path>`)
//! 3. **User** (`$RATSIGN_HOME/config.toml` or `~/.ratsign/config.toml`)
//! 4. **Embedded defaults** (`defaults.toml` compiled into binary)
//!
//! This crate has no dependencies on other ratsign crates. The CLI converts
//! config values into crypto and telemetry types at startup.

/// Environment variable overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{LoadOptions, ResolvedConfig};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`] for the algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit_file: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(&LoadOptions {
            explicit_file,
            ..LoadOptions::default()
        })
    }

    /// Load configuration with an explicit home directory override.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load_with_home(
        home_dir: &std::path::Path,
        explicit_file: Option<&std::path::Path>,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(&LoadOptions {
            home_override: Some(home_dir),
            explicit_file,
        })
    }
}
