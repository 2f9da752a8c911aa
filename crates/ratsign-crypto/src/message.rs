//! Canonical signing message.

use crate::hash::FileDigest;

/// The exact bytes that are signed and verified:
/// `SHA-256(file) || UTF-8(comment)`.
///
/// A missing comment is the empty string, so an unsigned-comment file and
/// a file signed with `""` produce the same message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningMessage(Vec<u8>);

impl SigningMessage {
    /// Build the message from a digest and an optional comment.
    #[must_use]
    pub fn new(digest: &FileDigest, comment: Option<&str>) -> Self {
        let comment = comment.unwrap_or_default().as_bytes();
        let mut bytes = Vec::with_capacity(digest.as_bytes().len().saturating_add(comment.len()));
        bytes.extend_from_slice(digest.as_bytes());
        bytes.extend_from_slice(comment);
        Self(bytes)
    }

    /// Get the message bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_digest_then_comment() {
        let digest = FileDigest::of_bytes(b"payload");
        let msg = SigningMessage::new(&digest, Some("release:1"));
        assert_eq!(&msg.as_bytes()[..32], digest.as_bytes());
        assert_eq!(&msg.as_bytes()[32..], b"release:1");
    }

    #[test]
    fn test_missing_comment_equals_empty_comment() {
        let digest = FileDigest::of_bytes(b"");
        assert_eq!(
            SigningMessage::new(&digest, None),
            SigningMessage::new(&digest, Some(""))
        );
        assert_eq!(SigningMessage::new(&digest, None).as_bytes().len(), 32);
    }

    #[test]
    fn test_comment_is_utf8() {
        let digest = FileDigest::of_bytes(b"x");
        let msg = SigningMessage::new(&digest, Some("übersetzt"));
        assert_eq!(&msg.as_bytes()[32..], "übersetzt".as_bytes());
    }
}
