//! `Fieldgate` Device Trust and Telemetry Crypto Library
//!
//! Cryptographic core for the gateway: certificate verification against a
//! trusted CA, P-256 ECDH key agreement with devices, and authenticated
//! decryption of telemetry under the three supported cipher suites.
//!
//! ## Primitives
//!
//! - **Trust**: X.509 verification (issuer, validity, signature) plus
//!   SPKI-level binding of the device's claimed public key
//! - **Key agreement**: prime256v1 ephemeral ECDH → 32-byte shared secret
//! - **Telemetry**: AES-128-CBC + HMAC-SHA256, PRESENT-CBC with a
//!   truncated SHA-256 tag, and ChaCha20-Poly1305

pub mod error;
pub mod handshake;
pub mod hexfield;
pub mod padding;
pub mod present;
pub mod suites;

pub use error::{CryptoError, HandshakeError};
pub use handshake::{
    CERT_DER_LEN, CERT_HEX_LEN, CertificateSummary, KeyAgreement, TrustedCa, agree_key,
    bind_public_key,
};
pub use present::Present;
#[cfg(any(test, feature = "test-utils"))]
pub use suites::{encrypt_aes128_cbc_hmac, encrypt_chachapoly, encrypt_present_cbc};
pub use suites::{
    AesCbcHmacInput, ChaChaPolyInput, CipherSuite, PresentCbcInput, SuiteOptions, SuiteRequest,
    decrypt_telemetry,
};
