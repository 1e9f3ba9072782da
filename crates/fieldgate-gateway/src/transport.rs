//! Outbound seams: the message transport and the device-status sink.
//!
//! The gateway never owns a broker connection; whoever embeds it supplies
//! a [`Publisher`]. Status updates feed an operator-facing layer through
//! [`StatusSink`]; the no-op implementation is for tests and headless
//! deployments.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Publishing to the transport failed. Aborts the in-progress operation.
#[derive(Debug, Error)]
#[error("publish to {topic} failed: {message}")]
pub struct PublishError {
    pub topic: String,
    pub message: String,
}

/// Outbound message transport.
pub trait Publisher: Send + Sync {
    fn publish(
        &self,
        topic: &str,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

/// Per-device progress updates during handshake, telemetry, and lifecycle
/// operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    VerifyingCertificate,
    CertificateValid,
    KeyBound,
    SecretDerived,
    TelemetryDecrypted,
    CertificateRenewed,
    CertificateRevoked,
    Failed {
        category: ErrorCategory,
        message: String,
    },
}

pub trait StatusSink: Send + Sync {
    fn device_status(
        &self,
        device_id: &str,
        update: StatusUpdate,
    ) -> impl Future<Output = ()> + Send;
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatusSink;

impl StatusSink for NoopStatusSink {
    async fn device_status(&self, _device_id: &str, _update: StatusUpdate) {}
}
