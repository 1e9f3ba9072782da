//! Topic addressing: `<namespace>/<deviceId>/<kind>`.
//!
//! Parsing is total: anything that is not a well-formed three-segment
//! address in our namespace with a known kind yields `None`, and the
//! router drops it with a diagnostic rather than erroring.

use std::fmt;

/// Message kinds carried in the third topic segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Device → gateway: public key + certificate for onboarding.
    DeviceKey,
    /// Device → gateway: encrypted telemetry.
    Sensors,
    /// Gateway → device: renewed certificate bundle.
    DeviceCert,
    /// Gateway → device: server ECDH public key.
    ServerKey,
    /// Device → gateway: renewal request.
    RenewCert,
    /// Device → gateway: renewal confirmation.
    CertConfirmation,
    /// Gateway → device: revocation notice.
    RevokeCert,
    /// Device → gateway: revocation confirmation.
    RevokeConfirmation,
    /// Gateway → consumers: decrypted telemetry echo.
    ProcessedData,
    /// Gateway → device: configuration push.
    Config,
}

impl MessageKind {
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        Some(match segment {
            "device_key" => Self::DeviceKey,
            "sensors" => Self::Sensors,
            "device_cert" => Self::DeviceCert,
            "server_key" => Self::ServerKey,
            "renew_cert" => Self::RenewCert,
            "cert_confirmation" => Self::CertConfirmation,
            "revoke_cert" => Self::RevokeCert,
            "revoke_confirmation" => Self::RevokeConfirmation,
            "processed_data" => Self::ProcessedData,
            "config" => Self::Config,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_segment(self) -> &'static str {
        match self {
            Self::DeviceKey => "device_key",
            Self::Sensors => "sensors",
            Self::DeviceCert => "device_cert",
            Self::ServerKey => "server_key",
            Self::RenewCert => "renew_cert",
            Self::CertConfirmation => "cert_confirmation",
            Self::RevokeCert => "revoke_cert",
            Self::RevokeConfirmation => "revoke_confirmation",
            Self::ProcessedData => "processed_data",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_segment())
    }
}

/// A parsed inbound address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub device_id: String,
    pub kind: MessageKind,
}

/// Parse `<namespace>/<deviceId>/<kind>`. Foreign namespaces, wrong
/// segment counts, empty device ids, and unknown kinds all yield `None`.
#[must_use]
pub fn parse(namespace: &str, topic: &str) -> Option<Topic> {
    let mut segments = topic.split('/');
    let ns = segments.next()?;
    let device_id = segments.next()?;
    let kind = segments.next()?;
    if segments.next().is_some() || ns != namespace || device_id.is_empty() {
        return None;
    }
    Some(Topic {
        device_id: device_id.to_string(),
        kind: MessageKind::from_segment(kind)?,
    })
}

/// Build an outbound topic string.
#[must_use]
pub fn build(namespace: &str, device_id: &str, kind: MessageKind) -> String {
    format!("{namespace}/{device_id}/{}", kind.as_segment())
}
