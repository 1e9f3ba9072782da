//! Explicit PKCS#7 validation.
//!
//! Decryption runs with automatic padding disabled; padding is checked here
//! so an out-of-range or inconsistent pad fails with a padding-classified
//! error instead of silently truncating.

use crate::error::CryptoError;

/// Validate PKCS#7 padding and return the unpadded prefix.
///
/// The final byte N must be in `[1, block_size]` and the last N bytes must
/// all equal N.
pub fn strip_pkcs7(buf: &[u8], block_size: usize) -> Result<&[u8], CryptoError> {
    let Some(&pad) = buf.last() else {
        return Err(CryptoError::InvalidPadding(0));
    };
    let pad_len = pad as usize;
    if pad_len == 0 || pad_len > block_size || pad_len > buf.len() {
        return Err(CryptoError::InvalidPadding(pad));
    }
    if buf[buf.len() - pad_len..].iter().any(|&b| b != pad) {
        return Err(CryptoError::InconsistentPadding);
    }
    Ok(&buf[..buf.len() - pad_len])
}

/// Apply PKCS#7 padding. Encrypt-side helper for tests only.
#[cfg(any(test, feature = "test-utils"))]
pub fn pad_pkcs7(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad_len = block_size - (data.len() % block_size);
    let mut out = data.to_vec();
    out.resize(data.len() + pad_len, pad_len as u8);
    out
}
