//! Keygen command: create a password-protected key file.

use std::path::PathBuf;

use ratsign_config::Config;
use ratsign_crypto::KeyFile;
use ratsign_crypto::kdf::check_iterations;
use ratsign_crypto::keygen::KeyGenerator;

use super::{Outcome, password};
use crate::theme::Theme;

/// Arguments for `ratsign keygen`.
#[derive(Debug, Default)]
pub(crate) struct KeygenArgs {
    pub(crate) out: Option<PathBuf>,
    pub(crate) iterations: Option<u32>,
    pub(crate) name: Option<String>,
}

/// Resolve flags against config defaults into a generator and directory.
fn plan(args: KeygenArgs, config: &Config) -> anyhow::Result<(KeyGenerator, PathBuf)> {
    let iterations = args.iterations.unwrap_or(config.keygen.iterations);
    check_iterations(iterations)?;

    let mut generator = KeyGenerator::new().iterations(iterations);
    if let Some(name) = args.name {
        generator = generator.name(name);
    }
    let output_dir = args
        .out
        .unwrap_or_else(|| PathBuf::from(&config.keygen.output_dir));
    Ok((generator, output_dir))
}

/// Generate a key pair and write it as `<name>.sec.json`.
pub(crate) async fn run(args: KeygenArgs, config: &Config) -> anyhow::Result<Outcome> {
    // Bad flags fail before the user is asked for anything.
    let (generator, output_dir) = plan(args, config)?;
    let password = password::prompt_new()?;

    let path = generator.generate(&output_dir, &password).await?;
    let key_file = KeyFile::load(&path).await?;

    println!("{}", Theme::success("Key file created."));
    println!("{}", Theme::field("Key file", &path.display().to_string()));
    println!("{}", Theme::field("Key ID", &key_file.key_id().to_base64()));
    println!(
        "{}",
        Theme::field("Public key", &key_file.public_key().to_base64())
    );
    println!();
    println!(
        "{}",
        Theme::warning("Keep the key file private. Share only the public key or Key ID.")
    );

    Ok(Outcome::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_uses_config_defaults() {
        let config = Config::default();
        let (_, dir) = plan(KeygenArgs::default(), &config).unwrap();
        assert_eq!(dir, PathBuf::from(&config.keygen.output_dir));
    }

    #[test]
    fn test_plan_flags_override_config() {
        let args = KeygenArgs {
            out: Some(PathBuf::from("keys")),
            iterations: Some(20_000),
            name: Some("release".to_owned()),
        };
        let (_, dir) = plan(args, &Config::default()).unwrap();
        assert_eq!(dir, PathBuf::from("keys"));
    }

    #[test]
    fn test_plan_rejects_low_iterations() {
        let args = KeygenArgs {
            iterations: Some(1_000),
            ..KeygenArgs::default()
        };
        assert!(plan(args, &Config::default()).is_err());
    }
}
