//! Version command.

use super::Outcome;
use crate::theme::Theme;

/// Print the tool name, version and description.
pub(crate) fn run() -> Outcome {
    println!(
        "{} {}",
        Theme::header(env!("CARGO_BIN_NAME")),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!(
        "{}",
        Theme::dimmed(&format!(
            "{} ({})",
            env!("CARGO_PKG_AUTHORS"),
            env!("CARGO_PKG_LICENSE")
        ))
    );
    Outcome::Success
}
