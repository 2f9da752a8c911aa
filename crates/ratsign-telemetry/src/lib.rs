//! Ratsign Telemetry - `tracing` subscriber setup for the ratsign tool.
//!
//! # Example
//!
//! ```rust,no_run
//! use ratsign_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), ratsign_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("ratsign_crypto=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{FileRotation, LogConfig, LogFormat, LogTarget, setup_logging};
