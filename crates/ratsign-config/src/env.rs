//! Environment variable overrides.
//!
//! `RATSIGN_*` variables form the highest-precedence layer. They are applied
//! to the merged TOML tree before deserialization so the usual validation
//! still runs on the result.

use std::collections::HashMap;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::set_path;

/// Alternate directory holding the user `config.toml`.
pub const HOME_VAR: &str = "RATSIGN_HOME";

/// Environment variables and the config field each one overrides.
const OVERRIDES: &[(&str, &str, Kind)] = &[
    ("RATSIGN_ITERATIONS", "keygen.iterations", Kind::Integer),
    ("RATSIGN_OUTPUT_DIR", "keygen.output_dir", Kind::String),
    ("RATSIGN_LOG_LEVEL", "logging.level", Kind::String),
    ("RATSIGN_LOG_FORMAT", "logging.format", Kind::String),
    ("RATSIGN_LOG_TARGET", "logging.target", Kind::String),
    ("RATSIGN_LOG_DIR", "logging.directory", Kind::String),
    ("RATSIGN_LOG_ROTATION", "logging.rotation", Kind::String),
];

#[derive(Clone, Copy)]
enum Kind {
    Integer,
    String,
}

/// Snapshot the `RATSIGN_*` variables of the current process.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("RATSIGN_"))
        .collect()
}

/// Apply overrides from `env_vars` to `merged`. Returns how many were applied.
///
/// Empty values are ignored.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a numeric variable does not parse.
pub fn apply_env_overrides(
    merged: &mut toml::Value,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<usize> {
    let mut applied = 0usize;
    for (var, field, kind) in OVERRIDES {
        let Some(raw) = env_vars.get(*var).map(|v| v.trim()) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }

        let value = match kind {
            Kind::Integer => raw
                .parse::<i64>()
                .map(toml::Value::Integer)
                .map_err(|e| ConfigError::EnvError {
                    var_name: (*var).to_owned(),
                    message: format!("expected an integer: {e}"),
                })?,
            Kind::String => toml::Value::String(raw.to_owned()),
        };

        set_path(merged, field, value);
        tracing::debug!(var = *var, field = *field, "applied environment override");
        applied = applied.saturating_add(1);
    }
    Ok(applied)
}
