//! Any change to the file, the signature or the key file must be caught.

#![allow(clippy::arithmetic_side_effects)]

mod common;

use common::{Fixture, PASSWORD, edit_json};
use ratsign_crypto::codec::{decode_base64, encode_base64};
use ratsign_crypto::verifier::verify_file;
use ratsign_crypto::{CryptoError, KeyFile, Signer, TrustAnchor, Verification, signer};

async fn signed_fixture() -> (Fixture, std::path::PathBuf, std::path::PathBuf) {
    let fixture = Fixture::new().await;
    let payload = fixture.write("payload.bin", b"the quick brown fox");
    let sig_path = fixture.sign(&payload, Some("release:1")).await;
    (fixture, payload, sig_path)
}

fn flip_base64_field(
    map: &mut serde_json::Map<String, serde_json::Value>,
    field: &str,
    index: usize,
) {
    let encoded = map[field].as_str().unwrap().to_owned();
    let mut bytes = decode_base64(&encoded).unwrap();
    let index = index.min(bytes.len() - 1);
    bytes[index] ^= 0x01;
    map.insert(field.to_owned(), encode_base64(&bytes).into());
}

#[tokio::test]
async fn test_modified_file_rejected() {
    let (fixture, payload, sig_path) = signed_fixture().await;
    let anchor = TrustAnchor::PublicKey(fixture.public_key);

    let mut data = std::fs::read(&payload).unwrap();
    data[0] ^= 0x01;
    std::fs::write(&payload, &data).unwrap();

    let outcome = verify_file(&payload, &sig_path, &anchor).await.unwrap();
    assert_eq!(outcome, Verification::BadSignature);
}

#[tokio::test]
async fn test_appended_byte_rejected() {
    let (fixture, payload, sig_path) = signed_fixture().await;
    let anchor = TrustAnchor::PublicKey(fixture.public_key);

    let mut data = std::fs::read(&payload).unwrap();
    data.push(0);
    std::fs::write(&payload, &data).unwrap();

    let outcome = verify_file(&payload, &sig_path, &anchor).await.unwrap();
    assert!(!outcome.is_valid());
}

#[tokio::test]
async fn test_modified_comment_rejected() {
    let (fixture, payload, sig_path) = signed_fixture().await;
    let anchor = TrustAnchor::KeyId(fixture.public_key.key_id());

    edit_json(&sig_path, |map| {
        map.insert("comment".to_owned(), "release:2".into());
    });
    let outcome = verify_file(&payload, &sig_path, &anchor).await.unwrap();
    assert_eq!(outcome, Verification::BadSignature);
}

#[tokio::test]
async fn test_removed_comment_rejected() {
    let (fixture, payload, sig_path) = signed_fixture().await;
    let anchor = TrustAnchor::PublicKey(fixture.public_key);

    edit_json(&sig_path, |map| {
        map.remove("comment");
    });
    let outcome = verify_file(&payload, &sig_path, &anchor).await.unwrap();
    assert_eq!(outcome, Verification::BadSignature);
}

#[tokio::test]
async fn test_modified_signature_rejected() {
    let (fixture, payload, sig_path) = signed_fixture().await;
    let anchor = TrustAnchor::PublicKey(fixture.public_key);

    // Byte 10 sits inside the DER-encoded r value.
    edit_json(&sig_path, |map| flip_base64_field(map, "signature", 10));
    let outcome = verify_file(&payload, &sig_path, &anchor).await.unwrap();
    assert_eq!(outcome, Verification::BadSignature);
}

#[tokio::test]
async fn test_corrupt_der_rejected_not_error() {
    let (fixture, payload, sig_path) = signed_fixture().await;
    let anchor = TrustAnchor::PublicKey(fixture.public_key);

    // Byte 0 is the DER SEQUENCE tag.
    edit_json(&sig_path, |map| flip_base64_field(map, "signature", 0));
    let outcome = verify_file(&payload, &sig_path, &anchor).await.unwrap();
    assert_eq!(outcome, Verification::BadSignature);
}

#[tokio::test]
async fn test_tampered_key_file_fails_authentication() {
    for field in ["ciphertext", "authTag", "nonce", "salt"] {
        let fixture = Fixture::new().await;
        edit_json(&fixture.key_path, |map| flip_base64_field(map, field, 0));

        let result = Signer::unlock(&fixture.key_path, PASSWORD).await;
        assert!(
            matches!(result, Err(CryptoError::AuthenticationFailure)),
            "flipping {field} must fail authentication, got {result:?}"
        );
    }
}

#[tokio::test]
async fn test_swapped_public_key_in_key_file_rejected() {
    let fixture = Fixture::new().await;
    let other = Fixture::new().await;
    let other_json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&other.key_path).unwrap()).unwrap();

    // Swap in another key's public key and matching key id.
    edit_json(&fixture.key_path, |map| {
        map.insert("publicKey".to_owned(), other_json["publicKey"].clone());
        map.insert("keyId".to_owned(), other_json["keyId"].clone());
    });

    let result = KeyFile::open(&fixture.key_path, PASSWORD).await;
    assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
}

#[tokio::test]
async fn test_wrong_password() {
    let (fixture, payload, _) = signed_fixture().await;
    let result = signer::sign_file(&payload, &fixture.key_path, "wrong", None, None).await;
    assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
}

#[tokio::test]
async fn test_downgraded_iterations_rejected() {
    let fixture = Fixture::new().await;
    edit_json(&fixture.key_path, |map| {
        map.insert("iterations".to_owned(), 1000.into());
    });

    let result = KeyFile::load(&fixture.key_path).await;
    assert!(matches!(result, Err(CryptoError::KeyFileMalformed(_))));
}

#[tokio::test]
async fn test_unknown_key_file_version_rejected() {
    let fixture = Fixture::new().await;
    edit_json(&fixture.key_path, |map| {
        map.insert("formatVersion".to_owned(), 2.into());
    });

    let result = KeyFile::load(&fixture.key_path).await;
    assert!(matches!(result, Err(CryptoError::KeyFileMalformed(_))));
}

#[tokio::test]
async fn test_unknown_signature_version_rejected() {
    let (fixture, payload, sig_path) = signed_fixture().await;
    edit_json(&sig_path, |map| {
        map.insert("formatVersion".to_owned(), 99.into());
    });

    let anchor = TrustAnchor::PublicKey(fixture.public_key);
    let result = verify_file(&payload, &sig_path, &anchor).await;
    assert!(matches!(result, Err(CryptoError::SignatureFileMalformed(_))));
}
