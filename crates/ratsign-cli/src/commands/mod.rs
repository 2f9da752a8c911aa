//! Subcommand implementations.

pub(crate) mod keygen;
pub(crate) mod keyid;
pub(crate) mod password;
pub(crate) mod sign;
pub(crate) mod verify;
pub(crate) mod version;

/// How a command finished, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The command did what was asked.
    Success,
    /// A verification ran to completion and rejected the signature.
    Rejected,
}
