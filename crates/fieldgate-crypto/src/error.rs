//! Crypto error types.

/// Errors from telemetry decryption and related primitives.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid {field}: must be a hexadecimal string")]
    NotHex { field: &'static str },

    #[error("Invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Ciphertext length must be a multiple of {block_size} bytes, got {actual}")]
    CiphertextNotBlockAligned { block_size: usize, actual: usize },

    #[error("Tag verification failed: tag mismatch")]
    TagMismatch,

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid PKCS#7 padding: padding length {0}")]
    InvalidPadding(u8),

    #[error("Invalid PKCS#7 padding: inconsistent padding bytes")]
    InconsistentPadding,

    #[error("Failed to parse decrypted payload as JSON: {message}")]
    JsonParse {
        message: String,
        /// Unpadded plaintext, hex-encoded, for diagnostics. Only populated
        /// after tag verification has already succeeded.
        plaintext_hex: String,
    },

    #[error("Unsupported encryption type: {0}")]
    UnsupportedSuite(String),
}

/// Errors from certificate verification and key agreement.
///
/// Each verification step fails with its own variant so callers can emit
/// distinct status updates without string-matching.
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("Invalid certificate: must be a hexadecimal string")]
    CertificateNotHex,

    #[error("Certificate length incorrect: expected {expected} hex characters, got {actual}")]
    CertificateLength { expected: usize, actual: usize },

    #[error("Failed to parse certificate: {0}")]
    CertificateMalformed(String),

    #[error("Certificate issuer does not match CA subject")]
    IssuerMismatch,

    #[error("Certificate is not valid at current time")]
    NotCurrentlyValid,

    #[error("Certificate verification failed: invalid signature")]
    SignatureInvalid,

    #[error("Device public key does not match certificate public key")]
    KeyMismatch,

    #[error("Invalid public key coordinates: {0}")]
    InvalidPublicKey(String),

    #[error("Key agreement failed: {0}")]
    KeyAgreementFailed(String),
}
