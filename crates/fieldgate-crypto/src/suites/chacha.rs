//! ChaCha20-Poly1305 AEAD suite.
//!
//! The 32-byte shared secret is used directly as the key. Authentication and
//! decryption happen in one AEAD call; a tag mismatch or truncation fails
//! closed with no partial plaintext exposure.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use tracing::debug;

use super::ChaChaPolyInput;
use crate::error::CryptoError;
use crate::hexfield;

pub(super) fn decrypt(
    input: &ChaChaPolyInput,
    secret: &[u8; 32],
) -> Result<serde_json::Value, CryptoError> {
    let ciphertext = hexfield::decode_any("ciphertext", &input.ciphertext)?;
    let tag = hexfield::decode_exact("tag", &input.tag, 16)?;
    let nonce = hexfield::decode_exact("nonce", &input.nonce, 12)?;

    debug!(
        ciphertext_len = ciphertext.len(),
        key_preview = %hexfield::preview(secret),
        "decrypting chachapoly payload"
    );

    // The aead API authenticates ciphertext‖tag in a single call.
    let mut combined = ciphertext;
    combined.extend_from_slice(&tag);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(secret));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), combined.as_ref())
        .map_err(|_| CryptoError::TagMismatch)?;

    match serde_json::from_slice::<serde_json::Value>(&plaintext) {
        Ok(value) if value.is_object() => Ok(value),
        Ok(_) => Err(CryptoError::JsonParse {
            message: "decrypted payload is not a JSON object".into(),
            plaintext_hex: hex::encode(&plaintext),
        }),
        Err(err) => Err(CryptoError::JsonParse {
            message: err.to_string(),
            plaintext_hex: hex::encode(&plaintext),
        }),
    }
}

/// Encrypt-side counterpart for round-trip tests.
///
/// Returns `(ciphertext_hex, tag_hex)` for the given nonce.
#[cfg(any(test, feature = "test-utils"))]
pub fn encrypt_chachapoly(plaintext: &[u8], secret: &[u8; 32], nonce: &[u8; 12]) -> (String, String) {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(secret));
    #[allow(clippy::unwrap_used)]
    let combined = cipher.encrypt(Nonce::from_slice(nonce), plaintext).unwrap();
    let (ciphertext, tag) = combined.split_at(combined.len() - 16);
    (hex::encode(ciphertext), hex::encode(tag))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [0x5Au8; 32];
    const NONCE: [u8; 12] = [0x0Fu8; 12];

    fn input(ciphertext: String, tag: String) -> ChaChaPolyInput {
        ChaChaPolyInput {
            ciphertext,
            tag,
            nonce: hex::encode(NONCE),
        }
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let payload = br#"{"device_id":"de:ad:be","wifi_rssi":-61}"#;
        let (ct, tag) = encrypt_chachapoly(payload, &SECRET, &NONCE);
        let value = decrypt(&input(ct, tag), &SECRET).unwrap();
        assert_eq!(value["wifi_rssi"], -61);
    }

    #[test]
    fn tag_mismatch_returns_no_plaintext() {
        let (ct, tag) = encrypt_chachapoly(br#"{"a":1}"#, &SECRET, &NONCE);
        let mut tag_bytes = hex::decode(&tag).unwrap();
        tag_bytes[5] ^= 0x10;
        let err = decrypt(&input(ct, hex::encode(tag_bytes)), &SECRET).unwrap_err();
        assert!(matches!(err, CryptoError::TagMismatch));
    }

    #[test]
    fn ciphertext_bit_flip_fails_closed() {
        let (ct, tag) = encrypt_chachapoly(br#"{"a":1}"#, &SECRET, &NONCE);
        let mut bytes = hex::decode(&ct).unwrap();
        bytes[0] ^= 0x01;
        let err = decrypt(&input(hex::encode(bytes), tag), &SECRET).unwrap_err();
        assert!(matches!(err, CryptoError::TagMismatch));
    }

    #[test]
    fn nonce_bit_flip_fails_closed() {
        let (ct, tag) = encrypt_chachapoly(br#"{"a":1}"#, &SECRET, &NONCE);
        let mut bad_nonce = NONCE;
        bad_nonce[11] ^= 0x01;
        let req = ChaChaPolyInput {
            ciphertext: ct,
            tag,
            nonce: hex::encode(bad_nonce),
        };
        let err = decrypt(&req, &SECRET).unwrap_err();
        assert!(matches!(err, CryptoError::TagMismatch));
    }

    #[test]
    fn rejects_wrong_nonce_length_before_crypto() {
        let err = decrypt(
            &ChaChaPolyInput {
                ciphertext: "0011".into(),
                tag: "00".repeat(16),
                nonce: "00".repeat(8),
            },
            &SECRET,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidLength { field: "nonce", expected: 12, actual: 8 }
        ));
    }

    #[test]
    fn rejects_non_object_json_plaintext() {
        // A bare scalar parses as JSON but is not a telemetry record.
        let (ct, tag) = encrypt_chachapoly(b"42", &SECRET, &NONCE);
        let err = decrypt(&input(ct, tag), &SECRET).unwrap_err();
        assert!(matches!(err, CryptoError::JsonParse { .. }));
    }

    #[test]
    fn non_json_plaintext_reports_hex() {
        let (ct, tag) = encrypt_chachapoly(b"raw sensor bytes", &SECRET, &NONCE);
        let err = decrypt(&input(ct, tag), &SECRET).unwrap_err();
        match err {
            CryptoError::JsonParse { plaintext_hex, .. } => {
                assert_eq!(plaintext_hex, hex::encode(b"raw sensor bytes"));
            }
            other => panic!("expected JsonParse, got {other:?}"),
        }
    }
}
