//! Conversion from `ratsign_config::Config` to runtime types.

use ratsign_config::Config;
use ratsign_telemetry::{
    FileRotation, LogConfig, LogFormat, LogTarget, TelemetryError, TelemetryResult,
};

/// Build the logging configuration from the resolved config.
///
/// # Errors
///
/// Returns [`TelemetryError::ConfigError`] for an unknown format, target or
/// rotation.
pub(crate) fn to_log_config(cfg: &Config) -> TelemetryResult<LogConfig> {
    let logging = &cfg.logging;
    let format = logging.format.parse::<LogFormat>()?;

    let mut log_config = LogConfig::new(&logging.level).with_format(format);
    log_config = match logging.target.as_str() {
        "stderr" => log_config.with_target(LogTarget::Stderr),
        "stdout" => log_config.with_target(LogTarget::Stdout),
        "file" => {
            let rotation = logging.rotation.parse::<FileRotation>()?;
            log_config.with_file_logging(&logging.directory, rotation)
        },
        other => {
            return Err(TelemetryError::ConfigError(format!(
                "unknown log target '{other}'"
            )));
        },
    };

    for directive in &logging.directives {
        log_config = log_config.with_directive(directive);
    }
    Ok(log_config)
}
