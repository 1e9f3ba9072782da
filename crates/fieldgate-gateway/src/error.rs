//! Gateway error type and its stable failure categories.

use fieldgate_crypto::{CryptoError, HandshakeError};
use thiserror::Error;

use crate::ca::CaError;
use crate::transport::PublishError;

/// Stable classification of gateway failures, used for status-sink
/// reporting and log fields. Variants are coarse on purpose: dashboards
/// key off them, so they must not churn with internal refactors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or inconsistent input, rejected before cryptographic work.
    Validation,
    /// Authentication-tag or padding verification failed.
    Integrity,
    /// Certificate chain, validity, or key-binding failure.
    Trust,
    /// Publishing to the transport failed.
    Transport,
    /// Confirmation timeouts, in-flight conflicts, device-reported errors.
    Coordination,
    /// The external CA service misbehaved.
    ExternalService,
}

impl ErrorCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Integrity => "integrity",
            Self::Trust => "trust",
            Self::Transport => "transport",
            Self::Coordination => "coordination",
            Self::ExternalService => "external_service",
        }
    }
}

/// Anything a gateway operation can fail with.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("malformed payload: {0}")]
    Payload(String),

    #[error("device id mismatch: topic says {topic}, payload says {payload}")]
    DeviceIdMismatch { topic: String, payload: String },

    #[error("unknown device: {0}")]
    UnknownDevice(String),

    #[error("no shared secret available for device {0}")]
    MissingSecret(String),

    #[error("device {device_id} is {status}, telemetry rejected")]
    DeviceNotActive { device_id: String, status: String },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error(transparent)]
    Store(#[from] fieldgate_core::Error),

    #[error(transparent)]
    Ca(#[from] CaError),

    #[error(transparent)]
    Transport(#[from] PublishError),

    #[error("{kind} already in flight for device {device_id}")]
    OperationInFlight { device_id: String, kind: String },

    #[error("no confirmation from {device_id} after {attempts} attempt(s)")]
    ConfirmationTimeout { device_id: String, attempts: u32 },

    #[error("device {device_id} reported failure: {message}")]
    DeviceReported { device_id: String, message: String },
}

impl GatewayError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Payload(_) | Self::DeviceIdMismatch { .. } | Self::UnknownDevice(_) => {
                ErrorCategory::Validation
            }
            Self::Crypto(e) => match e {
                CryptoError::TagMismatch
                | CryptoError::DecryptionFailed(_)
                | CryptoError::InvalidPadding(_)
                | CryptoError::InconsistentPadding => ErrorCategory::Integrity,
                _ => ErrorCategory::Validation,
            },
            Self::Handshake(_) | Self::DeviceNotActive { .. } | Self::MissingSecret(_) => {
                ErrorCategory::Trust
            }
            Self::Store(e) => match e {
                fieldgate_core::Error::AlreadyRevoked { .. }
                | fieldgate_core::Error::DeviceExists(_)
                | fieldgate_core::Error::DeviceNotFound(_) => ErrorCategory::Validation,
                _ => ErrorCategory::Coordination,
            },
            Self::Ca(_) => ErrorCategory::ExternalService,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::OperationInFlight { .. }
            | Self::ConfirmationTimeout { .. }
            | Self::DeviceReported { .. } => ErrorCategory::Coordination,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn integrity_failures_classify_as_integrity() {
        let err = GatewayError::from(CryptoError::TagMismatch);
        assert_eq!(err.category(), ErrorCategory::Integrity);
        let err = GatewayError::from(CryptoError::InvalidPadding(99));
        assert_eq!(err.category(), ErrorCategory::Integrity);
    }

    #[test]
    fn pre_crypto_rejections_classify_as_validation() {
        let err = GatewayError::from(CryptoError::NotHex {
            field: "ciphertext",
        });
        assert_eq!(err.category(), ErrorCategory::Validation);
        let err = GatewayError::from(CryptoError::UnsupportedSuite("rot13".into()));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn handshake_failures_classify_as_trust() {
        let err = GatewayError::from(HandshakeError::IssuerMismatch);
        assert_eq!(err.category(), ErrorCategory::Trust);
    }

    #[test]
    fn timeout_classifies_as_coordination() {
        let err = GatewayError::ConfirmationTimeout {
            device_id: "aa:bb".into(),
            attempts: 4,
        };
        assert_eq!(err.category(), ErrorCategory::Coordination);
    }
}
