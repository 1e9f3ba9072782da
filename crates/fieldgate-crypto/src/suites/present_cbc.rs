//! PRESENT-CBC suite with a truncated SHA-256 tag.
//!
//! Tag = SHA-256 over the raw ciphertext, truncated to 16 bytes, compared
//! in constant time. No JSON-recovery fallback for this suite.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;

use super::PresentCbcInput;
use crate::error::CryptoError;
use crate::hexfield;
use crate::padding::strip_pkcs7;
use crate::present::Present;

const BLOCK: usize = 8;

pub(super) fn decrypt(
    input: &PresentCbcInput,
    secret: &[u8; 32],
) -> Result<serde_json::Value, CryptoError> {
    let ciphertext = hexfield::decode_blocks("ciphertext", &input.ciphertext, BLOCK)?;
    let tag = hexfield::decode_exact("tag", &input.tag, 16)?;
    let iv = hexfield::decode_exact("iv", &input.iv, BLOCK)?;

    debug!(
        ciphertext_len = ciphertext.len(),
        key_preview = %hexfield::preview(secret),
        "verifying present-cbc tag"
    );

    let computed = Sha256::digest(&ciphertext);
    if computed[..16].ct_eq(&tag).unwrap_u8() != 1 {
        return Err(CryptoError::TagMismatch);
    }

    let mut key = [0u8; 16];
    key.copy_from_slice(&secret[..16]);
    let cipher = Present::new(&key);

    let mut decrypted = Vec::with_capacity(ciphertext.len());
    let mut prev = [0u8; 8];
    prev.copy_from_slice(&iv);
    for chunk in ciphertext.chunks_exact(BLOCK) {
        let mut ct_block = [0u8; 8];
        ct_block.copy_from_slice(chunk);
        let mut block = ct_block;
        cipher.decrypt_block(&mut block);
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        decrypted.extend_from_slice(&block);
        prev = ct_block;
    }

    let plaintext = strip_pkcs7(&decrypted, BLOCK)?;

    match serde_json::from_slice::<serde_json::Value>(plaintext) {
        Ok(value) if value.is_object() => Ok(value),
        Ok(_) => Err(CryptoError::JsonParse {
            message: "decrypted payload is not a JSON object".into(),
            plaintext_hex: hex::encode(plaintext),
        }),
        Err(err) => Err(CryptoError::JsonParse {
            message: err.to_string(),
            plaintext_hex: hex::encode(plaintext),
        }),
    }
}

/// Encrypt-side counterpart for round-trip tests.
///
/// Returns `(ciphertext_hex, tag_hex)` for the given IV.
#[cfg(any(test, feature = "test-utils"))]
pub fn encrypt_present_cbc(plaintext: &[u8], secret: &[u8; 32], iv: &[u8; 8]) -> (String, String) {
    use crate::padding::pad_pkcs7;

    let mut key = [0u8; 16];
    key.copy_from_slice(&secret[..16]);
    let cipher = Present::new(&key);

    let padded = pad_pkcs7(plaintext, BLOCK);
    let mut ciphertext = Vec::with_capacity(padded.len());
    let mut prev = *iv;
    for chunk in padded.chunks_exact(BLOCK) {
        let mut block = [0u8; 8];
        block.copy_from_slice(chunk);
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        cipher.encrypt_block(&mut block);
        ciphertext.extend_from_slice(&block);
        prev = block;
    }

    let tag = Sha256::digest(&ciphertext);
    (hex::encode(ciphertext), hex::encode(&tag[..16]))
}
