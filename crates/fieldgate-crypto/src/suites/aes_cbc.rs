//! AES-128-CBC + HMAC-SHA256 suite.
//!
//! Encrypt-then-MAC: the HMAC over the raw ciphertext is verified with the
//! full 32-byte shared secret before any decryption is attempted. AES runs
//! keyed by the secret's first 16 bytes with automatic padding disabled;
//! PKCS#7 is validated explicitly.

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use super::{AesCbcHmacInput, SuiteOptions};
use crate::error::CryptoError;
use crate::hexfield;
use crate::padding::strip_pkcs7;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type HmacSha256 = Hmac<Sha256>;

const BLOCK: usize = 16;

pub(super) fn decrypt(
    input: &AesCbcHmacInput,
    secret: &[u8; 32],
    options: SuiteOptions,
) -> Result<serde_json::Value, CryptoError> {
    let ciphertext = hexfield::decode_blocks("ciphertext", &input.ciphertext, BLOCK)?;
    let tag = hexfield::decode_exact("tag", &input.tag, 32)?;
    let iv = hexfield::decode_exact("nonce", &input.nonce, BLOCK)?;

    debug!(
        ciphertext_len = ciphertext.len(),
        key_preview = %hexfield::preview(secret),
        "verifying aes128-cbc-hmac tag"
    );

    // Fail closed on tag mismatch before touching the cipher. verify_slice
    // compares in constant time.
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;
    mac.update(&ciphertext);
    mac.verify_slice(&tag).map_err(|_| CryptoError::TagMismatch)?;

    let decrypted = Aes128CbcDec::new_from_slices(&secret[..16], &iv)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?
        .decrypt_padded_vec_mut::<NoPadding>(&ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

    let plaintext = strip_pkcs7(&decrypted, BLOCK)?;

    match serde_json::from_slice::<serde_json::Value>(plaintext) {
        Ok(value) if value.is_object() => Ok(value),
        Ok(_) => Err(CryptoError::JsonParse {
            message: "decrypted payload is not a JSON object".into(),
            plaintext_hex: hex::encode(plaintext),
        }),
        Err(err) => {
            if options.legacy_json_recovery {
                if let Some(device_id) = input.device_id.as_deref() {
                    warn!(device_id, "JSON parse failed, attempting legacy prefix recovery");
                    return recover_corrupted_prefix(plaintext, device_id);
                }
            }
            Err(CryptoError::JsonParse {
                message: err.to_string(),
                plaintext_hex: hex::encode(plaintext),
            })
        }
    }
}

/// Recovery shim for a firmware variant that corrupts the leading
/// `{"device_id":...` portion of the plaintext: everything before the first
/// comma after the first quote is replaced with a device_id prefix taken
/// from the transport address, then parsing is retried once.
fn recover_corrupted_prefix(
    plaintext: &[u8],
    device_id: &str,
) -> Result<serde_json::Value, CryptoError> {
    let raw = String::from_utf8_lossy(plaintext);
    let fixed = raw
        .find('"')
        .and_then(|quote| raw[quote..].find(',').map(|c| quote + c))
        .map(|comma| format!("{{\"device_id\":\"{device_id}\"{}", &raw[comma..]));

    let Some(fixed) = fixed else {
        return Err(CryptoError::JsonParse {
            message: "no recoverable JSON content after corrupted section".into(),
            plaintext_hex: hex::encode(plaintext),
        });
    };

    match serde_json::from_str::<serde_json::Value>(&fixed) {
        Ok(value) if value.is_object() => {
            debug!(device_id, "recovered JSON by replacing corrupted prefix");
            Ok(value)
        }
        _ => Err(CryptoError::JsonParse {
            message: "prefix recovery produced invalid JSON".into(),
            plaintext_hex: hex::encode(plaintext),
        }),
    }
}

/// Encrypt-side counterpart for round-trip tests.
///
/// Returns `(ciphertext_hex, tag_hex)` for the given IV.
#[cfg(any(test, feature = "test-utils"))]
pub fn encrypt_aes128_cbc_hmac(
    plaintext: &[u8],
    secret: &[u8; 32],
    iv: &[u8; 16],
) -> (String, String) {
    use aes::cipher::BlockEncryptMut;
    use crate::padding::pad_pkcs7;
    type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

    let padded = pad_pkcs7(plaintext, BLOCK);
    #[allow(clippy::unwrap_used)]
    let ciphertext = Aes128CbcEnc::new_from_slices(&secret[..16], iv)
        .unwrap()
        .encrypt_padded_vec_mut::<NoPadding>(&padded);

    #[allow(clippy::unwrap_used)]
    let mut mac = HmacSha256::new_from_slice(secret).unwrap();
    mac.update(&ciphertext);
    let tag = mac.finalize().into_bytes();

    (hex::encode(ciphertext), hex::encode(tag))
}
