//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Lowest accepted `keygen.iterations`. Mirrors the key file policy.
pub const MIN_ITERATIONS: u32 = 10_000;

/// Highest accepted `keygen.iterations`. Mirrors the key file policy.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_keygen(config)?;
    validate_sign(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_keygen(config: &Config) -> ConfigResult<()> {
    let k = &config.keygen;

    if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&k.iterations) {
        return Err(ConfigError::ValidationError {
            field: "keygen.iterations".to_owned(),
            message: format!(
                "iterations must be between {MIN_ITERATIONS} and {MAX_ITERATIONS}, got {}",
                k.iterations
            ),
        });
    }

    if k.output_dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "keygen.output_dir".to_owned(),
            message: "output_dir must not be empty".to_owned(),
        });
    }

    Ok(())
}

fn validate_sign(config: &Config) -> ConfigResult<()> {
    let ext = &config.sign.extension;
    if ext.is_empty() || ext.contains(['/', '\\', '.']) || ext.chars().any(char::is_whitespace) {
        return Err(ConfigError::ValidationError {
            field: "sign.extension".to_owned(),
            message: format!(
                "extension '{ext}' must be non-empty without dots, separators or whitespace"
            ),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        });
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        });
    }

    let valid_targets = ["stderr", "stdout", "file"];
    if !valid_targets.contains(&config.logging.target.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.target".to_owned(),
            message: format!(
                "unsupported log target '{}'; expected one of: {}",
                config.logging.target,
                valid_targets.join(", ")
            ),
        });
    }

    if config.logging.target == "file" && config.logging.directory.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.directory".to_owned(),
            message: "directory is required when target is 'file'".to_owned(),
        });
    }

    let valid_rotations = ["daily", "hourly", "never"];
    if !valid_rotations.contains(&config.logging.rotation.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.rotation".to_owned(),
            message: format!(
                "unsupported log rotation '{}'; expected one of: {}",
                config.logging.rotation,
                valid_rotations.join(", ")
            ),
        });
    }

    Ok(())
}
