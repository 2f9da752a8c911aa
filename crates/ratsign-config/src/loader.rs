//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the user config (`$RATSIGN_HOME/config.toml` or `~/.ratsign/config.toml`)
//! 3. Merge the explicit `--config` file, if any
//! 4. Apply `RATSIGN_*` environment overrides
//! 5. Deserialize merged tree → `Config`
//! 6. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::env::{HOME_VAR, apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: usize = 1_048_576;

/// A loaded configuration plus the files that contributed to it.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The merged, validated configuration.
    pub config: Config,
    /// Files merged on top of the defaults, lowest precedence first.
    pub loaded_files: Vec<PathBuf>,
}

/// Where to look for configuration.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions<'a> {
    /// Directory holding the user `config.toml`, bypassing `RATSIGN_HOME`
    /// and `~/.ratsign` discovery.
    pub home_override: Option<&'a Path>,
    /// Explicit config file (`--config`). Must exist.
    pub explicit_file: Option<&'a Path>,
}

/// Load configuration from the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(options: &LoadOptions<'_>) -> ConfigResult<ResolvedConfig> {
    load_with_env(options, &collect_env_vars())
}

/// Load configuration with an explicit set of `RATSIGN_*` variables.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, an
/// environment override does not parse, or the final merged configuration
/// fails validation.
pub fn load_with_env(
    options: &LoadOptions<'_>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Parse embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut loaded_files = Vec::new();

    // 2. User config.
    let user_path = user_config_path(options.home_override, env_vars)?;
    if let Some(overlay) = try_load_file(&user_path)? {
        deep_merge(&mut merged, &overlay);
        info!(path = %user_path.display(), "loaded user config");
        loaded_files.push(user_path);
    }

    // 3. Explicit file. A missing explicit file is an error, not a skip.
    if let Some(path) = options.explicit_file {
        let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        deep_merge(&mut merged, &overlay);
        info!(path = %path.display(), "loaded config file");
        loaded_files.push(path.to_path_buf());
    }

    // 4. Environment overrides.
    let env_count = apply_env_overrides(&mut merged, env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable overrides");
    }

    // 5. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 6. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;
    let config: Config = overlay
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
///
/// Uses a single read operation to avoid TOCTOU races (no separate
/// exists/metadata checks before reading).
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Resolve the user config path.
///
/// Precedence: explicit override, then a valid `RATSIGN_HOME`, then
/// `~/.ratsign/config.toml`.
fn user_config_path(
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<PathBuf> {
    if let Some(dir) = home_override {
        return Ok(dir.join("config.toml"));
    }

    if let Some(raw) = env_vars.get(HOME_VAR) {
        match PathBuf::from(raw).canonicalize() {
            Ok(dir) if dir.is_dir() => return Ok(dir.join("config.toml")),
            _ => warn!(path = %raw, "RATSIGN_HOME is not a directory; ignoring"),
        }
    }

    Ok(home_directory()?.join(".ratsign").join("config.toml"))
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
