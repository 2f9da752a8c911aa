//! Interactive password prompts.

use anyhow::bail;
use dialoguer::Password;
use dialoguer::theme::ColorfulTheme;
use zeroize::Zeroizing;

/// Prompt once for the password of an existing key file.
pub(crate) fn prompt_existing() -> anyhow::Result<Zeroizing<String>> {
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Key file password")
        .allow_empty_password(true)
        .interact()?;
    Ok(Zeroizing::new(password))
}

/// Prompt twice for the password protecting a new key file.
pub(crate) fn prompt_new() -> anyhow::Result<Zeroizing<String>> {
    let theme = ColorfulTheme::default();
    let first = Zeroizing::new(
        Password::with_theme(&theme)
            .with_prompt("New key file password")
            .interact()?,
    );
    let second = Zeroizing::new(
        Password::with_theme(&theme)
            .with_prompt("Repeat password")
            .interact()?,
    );
    confirm(first, &second)
}

fn confirm(first: Zeroizing<String>, second: &str) -> anyhow::Result<Zeroizing<String>> {
    if first.as_str() != second {
        bail!("passwords do not match");
    }
    Ok(first)
}
