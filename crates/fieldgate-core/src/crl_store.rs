//! Per-issuer certificate revocation list bookkeeping.
//!
//! Each issuer has a single CRL record with a monotonically increasing
//! `crl_number`. Appends for the same issuer are serialized behind a
//! per-issuer mutex so two concurrent revocations cannot both observe the
//! same number; different issuers never contend.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{Crl, RevokedCertificateEntry};

/// nextUpdate horizon for a freshly touched CRL.
pub const CRL_VALIDITY_DAYS: i64 = 30;

struct IssuerRecord {
    crl: Crl,
    /// Serial index for O(1) revocation checks.
    serials: HashSet<String>,
}

#[derive(Default, Clone)]
pub struct CrlStore {
    issuers: Arc<RwLock<HashMap<String, Arc<Mutex<IssuerRecord>>>>>,
}

impl CrlStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append entries to the issuer's CRL, creating the record on first
    /// revocation. Returns the updated CRL snapshot.
    ///
    /// A serial already on the list is rejected before anything changes:
    /// no entry is appended and the number is not incremented.
    pub async fn append(
        &self,
        issuer: &str,
        entries: Vec<RevokedCertificateEntry>,
        crl_pem: String,
    ) -> Result<Crl> {
        let record = self.issuer_record(issuer).await;
        let mut record = record.lock().await;

        for entry in &entries {
            if record.serials.contains(&entry.serial_number) {
                return Err(Error::AlreadyRevoked {
                    issuer: issuer.to_string(),
                    serial: entry.serial_number.clone(),
                });
            }
        }

        let now = Utc::now();
        record.crl.this_update = now;
        record.crl.next_update = now + Duration::days(CRL_VALIDITY_DAYS);
        record.crl.crl_number += 1;
        record.crl.crl_pem = crl_pem;
        for entry in entries {
            record.serials.insert(entry.serial_number.clone());
            record.crl.revoked_certificates.push(entry);
        }

        info!(
            issuer,
            crl_number = record.crl.crl_number,
            entries = record.crl.revoked_certificates.len(),
            "CRL updated"
        );
        Ok(record.crl.clone())
    }

    /// O(1) membership check against the issuer's serial index.
    pub async fn is_revoked(&self, issuer: &str, serial: &str) -> bool {
        let record = {
            let issuers = self.issuers.read().await;
            match issuers.get(issuer) {
                Some(record) => Arc::clone(record),
                None => return false,
            }
        };
        let record = record.lock().await;
        record.serials.contains(serial)
    }

    /// Current CRL snapshot for an issuer, if any revocation happened.
    pub async fn get(&self, issuer: &str) -> Option<Crl> {
        let record = {
            let issuers = self.issuers.read().await;
            Arc::clone(issuers.get(issuer)?)
        };
        let record = record.lock().await;
        Some(record.crl.clone())
    }

    async fn issuer_record(&self, issuer: &str) -> Arc<Mutex<IssuerRecord>> {
        {
            let issuers = self.issuers.read().await;
            if let Some(record) = issuers.get(issuer) {
                return Arc::clone(record);
            }
        }
        let mut issuers = self.issuers.write().await;
        Arc::clone(issuers.entry(issuer.to_string()).or_insert_with(|| {
            let now = Utc::now();
            Arc::new(Mutex::new(IssuerRecord {
                crl: Crl {
                    issuer: issuer.to_string(),
                    this_update: now,
                    next_update: now + Duration::days(CRL_VALIDITY_DAYS),
                    revoked_certificates: Vec::new(),
                    // append() bumps this to 1 on the first revocation.
                    crl_number: 0,
                    crl_pem: String::new(),
                },
                serials: HashSet::new(),
            }))
        }))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::RevocationReason;

    fn entry(device_id: &str, serial: &str, issuer: &str) -> RevokedCertificateEntry {
        RevokedCertificateEntry {
            device_id: device_id.to_string(),
            serial_number: serial.to_string(),
            revocation_date: Utc::now(),
            reason: RevocationReason::KeyCompromise,
            issuer: issuer.to_string(),
        }
    }

    #[tokio::test]
    async fn first_append_creates_crl_at_number_one() {
        let store = CrlStore::new();
        let crl = store
            .append("CN=Test CA", vec![entry("aa:bb", "01", "CN=Test CA")], "PEM".into())
            .await
            .unwrap();
        assert_eq!(crl.crl_number, 1);
        assert_eq!(crl.revoked_certificates.len(), 1);
        assert_eq!(crl.next_update - crl.this_update, Duration::days(30));
        assert!(store.is_revoked("CN=Test CA", "01").await);
    }

    #[tokio::test]
    async fn appends_increment_and_preserve_order() {
        let store = CrlStore::new();
        for serial in ["01", "02", "03"] {
            store
                .append(
                    "CN=Test CA",
                    vec![entry("aa:bb", serial, "CN=Test CA")],
                    format!("PEM-{serial}"),
                )
                .await
                .unwrap();
        }
        let crl = store.get("CN=Test CA").await.unwrap();
        assert_eq!(crl.crl_number, 3);
        let serials: Vec<_> = crl
            .revoked_certificates
            .iter()
            .map(|e| e.serial_number.as_str())
            .collect();
        assert_eq!(serials, ["01", "02", "03"]);
        assert_eq!(crl.crl_pem, "PEM-03");
    }

    #[tokio::test]
    async fn duplicate_serial_rejected_without_increment() {
        let store = CrlStore::new();
        store
            .append("CN=Test CA", vec![entry("aa:bb", "01", "CN=Test CA")], "PEM".into())
            .await
            .unwrap();
        let err = store
            .append("CN=Test CA", vec![entry("cc:dd", "01", "CN=Test CA")], "PEM2".into())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyRevoked { .. }));

        let crl = store.get("CN=Test CA").await.unwrap();
        assert_eq!(crl.crl_number, 1);
        assert_eq!(crl.revoked_certificates.len(), 1);
        assert_eq!(crl.crl_pem, "PEM");
    }

    #[tokio::test]
    async fn issuers_are_independent() {
        let store = CrlStore::new();
        store
            .append("CN=CA One", vec![entry("aa:bb", "01", "CN=CA One")], "P1".into())
            .await
            .unwrap();
        store
            .append("CN=CA Two", vec![entry("cc:dd", "01", "CN=CA Two")], "P2".into())
            .await
            .unwrap();

        assert!(store.is_revoked("CN=CA One", "01").await);
        assert!(store.is_revoked("CN=CA Two", "01").await);
        assert_eq!(store.get("CN=CA One").await.unwrap().crl_number, 1);
        assert_eq!(store.get("CN=CA Two").await.unwrap().crl_number, 1);
        assert!(!store.is_revoked("CN=CA Three", "01").await);
    }

    #[tokio::test]
    async fn concurrent_appends_assign_distinct_numbers() {
        let store = CrlStore::new();
        let mut handles = Vec::new();
        for i in 0..8u32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(
                        "CN=Test CA",
                        vec![entry("aa:bb", &format!("{i:02}"), "CN=Test CA")],
                        "PEM".into(),
                    )
                    .await
                    .unwrap()
                    .crl_number
            }));
        }
        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=8).collect::<Vec<u64>>());
    }
}
