//! Strict hex-field decoding for wire payloads.
//!
//! Every suite validates field format and length before any cryptographic
//! work, and the two failure modes stay distinguishable.

use crate::error::CryptoError;

/// Decode a hex field that must be exactly `expected` bytes long.
pub fn decode_exact(field: &'static str, hex_str: &str, expected: usize) -> Result<Vec<u8>, CryptoError> {
    let bytes = decode(field, hex_str)?;
    if bytes.len() != expected {
        return Err(CryptoError::InvalidLength {
            field,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Decode a hex field whose length must be a non-zero multiple of `block_size` bytes.
pub fn decode_blocks(
    field: &'static str,
    hex_str: &str,
    block_size: usize,
) -> Result<Vec<u8>, CryptoError> {
    let bytes = decode(field, hex_str)?;
    if bytes.is_empty() || bytes.len() % block_size != 0 {
        return Err(CryptoError::CiphertextNotBlockAligned {
            block_size,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Decode a hex field of any (non-empty) length.
pub fn decode_any(field: &'static str, hex_str: &str) -> Result<Vec<u8>, CryptoError> {
    decode(field, hex_str)
}

fn decode(field: &'static str, hex_str: &str) -> Result<Vec<u8>, CryptoError> {
    if hex_str.is_empty() || !hex_str.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CryptoError::NotHex { field });
    }
    hex::decode(hex_str).map_err(|_| CryptoError::NotHex { field })
}

/// Truncated hex preview for logging. Key material is never logged in full.
pub fn preview(bytes: &[u8]) -> String {
    let full = hex::encode(bytes);
    if full.len() <= 8 {
        full
    } else {
        format!("{}...", &full[..8])
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decode_exact_accepts_correct_length() {
        let bytes = decode_exact("tag", "deadbeef", 4).unwrap();
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn decode_exact_rejects_wrong_length() {
        let err = decode_exact("tag", "deadbe", 4).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidLength { field: "tag", expected: 4, actual: 3 }
        ));
    }

    #[test]
    fn decode_rejects_non_hex() {
        let err = decode_exact("nonce", "zzzz", 2).unwrap_err();
        assert!(matches!(err, CryptoError::NotHex { field: "nonce" }));
    }

    #[test]
    fn decode_rejects_odd_length_as_non_hex() {
        let err = decode_exact("nonce", "abc", 2).unwrap_err();
        assert!(matches!(err, CryptoError::NotHex { .. }));
    }

    #[test]
    fn decode_blocks_enforces_multiple() {
        assert!(decode_blocks("ciphertext", &"00".repeat(16), 16).is_ok());
        let err = decode_blocks("ciphertext", &"00".repeat(15), 16).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::CiphertextNotBlockAligned { block_size: 16, actual: 15 }
        ));
    }

    #[test]
    fn decode_blocks_rejects_empty() {
        assert!(decode_blocks("ciphertext", "", 8).is_err());
    }

    #[test]
    fn preview_truncates() {
        assert_eq!(preview(&[0xab; 32]), "abababab...");
        assert_eq!(preview(&[0x01, 0x02]), "0102");
    }
}
