//! Sign command: write a detached signature for a file.

use std::path::{Path, PathBuf};

use ratsign_config::Config;
use ratsign_crypto::{SignatureFile, Signer, check_comment};

use super::{Outcome, password};
use crate::theme::Theme;

/// Arguments for `ratsign sign`.
#[derive(Debug)]
pub(crate) struct SignArgs {
    pub(crate) file: PathBuf,
    pub(crate) key: PathBuf,
    pub(crate) out: Option<PathBuf>,
    pub(crate) comment: Option<String>,
}

/// Signature path: `--out`, or the file name plus the configured extension.
fn output_path(file: &Path, out: Option<PathBuf>, config: &Config) -> PathBuf {
    out.unwrap_or_else(|| SignatureFile::path_with_extension(file, &config.sign.extension))
}

/// Check the arguments that do not need the key, and resolve the output path.
fn plan(args: &SignArgs, config: &Config) -> anyhow::Result<PathBuf> {
    check_comment(args.comment.as_deref())?;
    Ok(output_path(&args.file, args.out.clone(), config))
}

/// Unlock the key file and sign `args.file`.
pub(crate) async fn run(args: SignArgs, config: &Config) -> anyhow::Result<Outcome> {
    let out = plan(&args, config)?;
    let password = password::prompt_existing()?;
    let signer = Signer::unlock(&args.key, &password).await?;

    let written = signer
        .sign_file(&args.file, Some(out.as_path()), args.comment.as_deref())
        .await?;

    println!("{}", Theme::success("File signed."));
    println!("{}", Theme::field("Signature", &written.display().to_string()));
    println!("{}", Theme::field("Key ID", &signer.key_id().to_base64()));
    if let Some(comment) = &args.comment {
        println!("{}", Theme::field("Comment", comment));
    }

    Ok(Outcome::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_default_extension() {
        let path = output_path(Path::new("dist/app.tar.gz"), None, &Config::default());
        assert_eq!(path, PathBuf::from("dist/app.tar.gz.ratsig"));
    }

    #[test]
    fn test_output_path_configured_extension() {
        let mut config = Config::default();
        "sig".clone_into(&mut config.sign.extension);
        let path = output_path(Path::new("app.bin"), None, &config);
        assert_eq!(path, PathBuf::from("app.bin.sig"));
    }

    fn args(comment: Option<String>) -> SignArgs {
        SignArgs {
            file: PathBuf::from("app.bin"),
            key: PathBuf::from("release.sec.json"),
            out: None,
            comment,
        }
    }

    #[test]
    fn test_plan_rejects_over_long_comment() {
        let comment = "x".repeat(ratsign_crypto::MAX_COMMENT_LEN.saturating_add(1));
        let err = plan(&args(Some(comment)), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("comment"));
    }

    #[test]
    fn test_plan_accepts_longest_comment() {
        let comment = "x".repeat(ratsign_crypto::MAX_COMMENT_LEN);
        let out = plan(&args(Some(comment)), &Config::default()).unwrap();
        assert_eq!(out, PathBuf::from("app.bin.ratsig"));
    }

    #[test]
    fn test_output_path_explicit() {
        let path = output_path(
            Path::new("app.bin"),
            Some(PathBuf::from("/tmp/out.ratsig")),
            &Config::default(),
        );
        assert_eq!(path, PathBuf::from("/tmp/out.ratsig"));
    }
}
