//! Error types for the `Fieldgate` core library.

use thiserror::Error;

/// Result type alias using `Fieldgate` core Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for device and CRL bookkeeping.
#[derive(Debug, Error)]
pub enum Error {
    /// Device lookup failed
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// A device with this identifier is already registered
    #[error("Device already registered: {0}")]
    DeviceExists(String),

    /// The certificate serial is already on the issuer's revocation list
    #[error("Serial {serial} already revoked by issuer {issuer}")]
    AlreadyRevoked { issuer: String, serial: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
