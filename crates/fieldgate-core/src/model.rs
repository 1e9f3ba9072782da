//! Device, revocation, and confirmation records.
//!
//! These are the persisted shapes shared between the gateway and any
//! storage backend. Timestamps serialize as RFC 3339 via chrono's serde
//! support.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored lifecycle state of a device certificate.
///
/// `Revoked` is terminal; `Expired` is usually *derived* from the expiry
/// timestamp (see [`Device::effective_status`]) rather than written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Expired,
    Revoked,
}

/// A registered device and its current certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub device_id: String,
    /// Certificate serial number, hex.
    pub serial: String,
    /// Raw certificate blob as hex.
    pub certificate: String,
    pub public_key_x: String,
    pub public_key_y: String,
    /// ECDH shared secret, hex. Absent until key agreement completes.
    pub shared_secret: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    pub status: DeviceStatus,
}

impl Device {
    /// Status as of `now`: a stored `Active` whose expiry has passed reads
    /// as `Expired`. `Revoked` always wins.
    #[must_use]
    pub fn effective_status(&self, now: DateTime<Utc>) -> DeviceStatus {
        match self.status {
            DeviceStatus::Revoked => DeviceStatus::Revoked,
            DeviceStatus::Active | DeviceStatus::Expired => {
                if now >= self.expiry {
                    DeviceStatus::Expired
                } else {
                    DeviceStatus::Active
                }
            }
        }
    }
}

/// RFC 5280 CRL entry reasons, camelCase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevocationReason {
    #[default]
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

/// One revoked certificate on an issuer's list. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedCertificateEntry {
    pub device_id: String,
    pub serial_number: String,
    pub revocation_date: DateTime<Utc>,
    pub reason: RevocationReason,
    pub issuer: String,
}

/// Per-issuer certificate revocation list record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crl {
    pub issuer: String,
    pub this_update: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
    /// Entries in append order.
    pub revoked_certificates: Vec<RevokedCertificateEntry>,
    /// Monotonic, starts at 1.
    pub crl_number: u64,
    pub crl_pem: String,
}

/// Confirmation outcome recorded after a certificate operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertConfirmation {
    pub device_id: String,
    pub status: ConfirmationStatus,
    pub certificate_hash: Option<String>,
    pub message: Option<String>,
    /// Device-reported timestamp from the confirmation payload.
    pub timestamp: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    Success,
    Error,
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn device(status: DeviceStatus, expiry: DateTime<Utc>) -> Device {
        Device {
            device_id: "aa:bb:cc:dd:ee:ff".to_string(),
            serial: "1a2b3c".to_string(),
            certificate: "ab".repeat(520),
            public_key_x: "11".repeat(32),
            public_key_y: "22".repeat(32),
            shared_secret: None,
            registered_at: Utc::now(),
            expiry,
            status,
        }
    }

    #[test]
    fn active_device_before_expiry_is_active() {
        let now = Utc::now();
        let d = device(DeviceStatus::Active, now + Duration::days(30));
        assert_eq!(d.effective_status(now), DeviceStatus::Active);
    }

    #[test]
    fn active_device_past_expiry_reads_expired() {
        let now = Utc::now();
        let d = device(DeviceStatus::Active, now - Duration::seconds(1));
        assert_eq!(d.effective_status(now), DeviceStatus::Expired);
    }

    #[test]
    fn revoked_is_terminal_even_with_future_expiry() {
        let now = Utc::now();
        let d = device(DeviceStatus::Revoked, now + Duration::days(365));
        assert_eq!(d.effective_status(now), DeviceStatus::Revoked);
    }

    #[test]
    fn stale_expired_flag_recovers_after_renewal_window() {
        // Renewal rewrites expiry; a leftover Expired flag must not stick.
        let now = Utc::now();
        let d = device(DeviceStatus::Expired, now + Duration::days(30));
        assert_eq!(d.effective_status(now), DeviceStatus::Active);
    }

    #[test]
    fn revocation_reason_serializes_camel_case() {
        let json = serde_json::to_string(&RevocationReason::KeyCompromise).unwrap();
        assert_eq!(json, "\"keyCompromise\"");
        let back: RevocationReason = serde_json::from_str("\"cessationOfOperation\"").unwrap();
        assert_eq!(back, RevocationReason::CessationOfOperation);
    }

    #[test]
    fn default_reason_is_unspecified() {
        assert_eq!(RevocationReason::default(), RevocationReason::Unspecified);
    }
}
