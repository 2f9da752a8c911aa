//! Keyid command: print the Key ID of a public key.

use ratsign_crypto::KeyId;

use super::Outcome;

/// Print `KeyId: <base64>` for a Base64 public key.
pub(crate) fn run(public_key: &str) -> anyhow::Result<Outcome> {
    let key_id = KeyId::from_public_key_base64(public_key)?;
    println!("KeyId: {key_id}");
    Ok(Outcome::Success)
}
