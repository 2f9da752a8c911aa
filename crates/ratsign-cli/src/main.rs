//! Ratsign CLI - detached file signatures with ECDSA P-256.
//!
//! Exit codes: `0` on success or a valid signature, `1` when a signature is
//! rejected, `2` on any other error.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod theme;

use commands::keygen::KeygenArgs;
use commands::sign::SignArgs;
use commands::verify::VerifyArgs;
use commands::{Outcome, keygen, keyid, sign, verify, version};
use theme::Theme;

/// Ratsign - sign files and verify detached signatures
#[derive(Parser)]
#[command(name = "ratsign")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a password-protected key file
    Keygen {
        /// Directory to write the key file into
        #[arg(long)]
        out: Option<PathBuf>,

        /// PBKDF2 iteration count
        #[arg(long)]
        iterations: Option<u32>,

        /// Key file name (without the .sec.json suffix)
        #[arg(long)]
        name: Option<String>,
    },

    /// Sign a file
    Sign {
        /// File to sign
        #[arg(long)]
        file: PathBuf,

        /// Key file (.sec.json)
        #[arg(long)]
        key: PathBuf,

        /// Signature output path (default: <file>.ratsig)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Trusted comment bound into the signature
        #[arg(long)]
        comment: Option<String>,
    },

    /// Verify a file against a signature
    Verify {
        /// File to verify
        #[arg(long)]
        file: PathBuf,

        /// Signature file
        #[arg(long)]
        sig: PathBuf,

        /// Trusted public key (Base64)
        #[arg(long = "pub", value_name = "PUBLIC_KEY")]
        public_key: Option<String>,

        /// Trusted Key ID (Base64)
        #[arg(long = "keyid", value_name = "KEY_ID")]
        key_id: Option<String>,
    },

    /// Print the Key ID of a public key
    Keyid {
        /// Public key (Base64)
        #[arg(long = "pub", value_name = "PUBLIC_KEY")]
        public_key: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let resolved = ratsign_config::Config::load(cli.config.as_deref());

    // Set up logging from config, with --verbose override. Defaults are used
    // when the config is unusable so its error is still reported below.
    let mut log_config = resolved
        .as_ref()
        .ok()
        .and_then(|resolved| {
            config_bridge::to_log_config(&resolved.config)
                .inspect_err(|e| eprintln!("Failed to apply logging config: {e}"))
                .ok()
        })
        .unwrap_or_default();
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = ratsign_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    tracing::debug!(
        level = %log_config.level,
        format = %log_config.format,
        target = ?log_config.target,
        "logging initialized"
    );

    let result = match resolved {
        Ok(resolved) => run(cli.command, &resolved.config).await,
        Err(e) => Err(anyhow::Error::new(e).context("failed to load configuration")),
    };

    match result {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Rejected) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{}", Theme::error(&format!("{e:#}")));
            ExitCode::from(2)
        },
    }
}

async fn run(command: Commands, config: &ratsign_config::Config) -> anyhow::Result<Outcome> {
    match command {
        Commands::Keygen {
            out,
            iterations,
            name,
        } => {
            keygen::run(
                KeygenArgs {
                    out,
                    iterations,
                    name,
                },
                config,
            )
            .await
        },
        Commands::Sign {
            file,
            key,
            out,
            comment,
        } => {
            sign::run(
                SignArgs {
                    file,
                    key,
                    out,
                    comment,
                },
                config,
            )
            .await
        },
        Commands::Verify {
            file,
            sig,
            public_key,
            key_id,
        } => {
            verify::run(VerifyArgs {
                file,
                sig,
                public_key,
                key_id,
            })
            .await
        },
        Commands::Keyid { public_key } => keyid::run(&public_key),
        Commands::Version => Ok(version::run()),
    }
}
