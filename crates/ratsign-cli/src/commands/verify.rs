//! Verify command: check a detached signature against a trust anchor.

use std::path::PathBuf;

use anyhow::{Context, bail};
use ratsign_crypto::verifier::verify_signature_file;
use ratsign_crypto::{SignatureFile, TrustAnchor, Verification};

use super::Outcome;
use crate::theme::Theme;

/// Arguments for `ratsign verify`.
#[derive(Debug)]
pub(crate) struct VerifyArgs {
    pub(crate) file: PathBuf,
    pub(crate) sig: PathBuf,
    pub(crate) public_key: Option<String>,
    pub(crate) key_id: Option<String>,
}

/// Pick the trust anchor. A public key wins over a key id.
pub(crate) fn resolve_trust_anchor(
    public_key: Option<&str>,
    key_id: Option<&str>,
) -> anyhow::Result<TrustAnchor> {
    match (public_key, key_id) {
        (Some(public_key), key_id) => {
            if key_id.is_some() {
                eprintln!(
                    "{}",
                    Theme::warning("Both --pub and --keyid given; using --pub.")
                );
            }
            TrustAnchor::from_public_key_base64(public_key).context("invalid --pub value")
        },
        (None, Some(key_id)) => {
            TrustAnchor::from_key_id_base64(key_id).context("invalid --keyid value")
        },
        (None, None) => bail!("a trust anchor is required: pass --pub or --keyid"),
    }
}

/// Verify `args.file` against `args.sig`.
pub(crate) async fn run(args: VerifyArgs) -> anyhow::Result<Outcome> {
    let anchor = resolve_trust_anchor(args.public_key.as_deref(), args.key_id.as_deref())?;
    let signature_file = SignatureFile::load(&args.sig).await?;

    match verify_signature_file(&args.file, &signature_file, &anchor).await? {
        Verification::Valid => {
            println!("{}", Theme::success("Signature valid."));
            println!("{}", Theme::field("Key ID", &anchor.key_id().to_base64()));
            if let Some(comment) = signature_file.comment() {
                println!("{}", Theme::field("Comment", comment));
            }
            Ok(Outcome::Success)
        },
        Verification::KeyMismatch => {
            println!(
                "{}",
                Theme::error("Signature was made by a different key than the trusted Key ID.")
            );
            println!(
                "{}",
                Theme::field("Signed by", &signature_file.embedded_key_id().to_base64())
            );
            Ok(Outcome::Rejected)
        },
        Verification::BadSignature => {
            println!("{}", Theme::error("Signature invalid."));
            Ok(Outcome::Rejected)
        },
    }
}
