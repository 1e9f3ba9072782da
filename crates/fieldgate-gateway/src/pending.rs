//! In-flight confirmation tracking.
//!
//! One pending slot per `(device_id, operation)` pair: registering while a
//! slot is occupied fails, which serializes lifecycle operations per
//! device. Slots live only in memory; a process restart drops in-flight
//! confirmations and the device simply retries.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, oneshot};
use tracing::debug;

use fieldgate_core::model::ConfirmationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Renew,
    Revoke,
}

impl OperationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Renew => "renewal",
            Self::Revoke => "revocation",
        }
    }
}

/// A device's answer to a certificate operation.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub status: ConfirmationStatus,
    pub certificate_hash: Option<String>,
    pub message: Option<String>,
    pub timestamp: Option<String>,
}

type PendingKey = (String, OperationKind);

#[derive(Default, Clone)]
pub struct PendingConfirmations {
    slots: Arc<Mutex<HashMap<PendingKey, oneshot::Sender<Confirmation>>>>,
}

impl PendingConfirmations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for this device+operation. `None` when an operation
    /// of the same kind is already awaiting its confirmation.
    pub async fn register(
        &self,
        device_id: &str,
        kind: OperationKind,
    ) -> Option<oneshot::Receiver<Confirmation>> {
        let mut slots = self.slots.lock().await;
        let key = (device_id.to_string(), kind);
        if slots.contains_key(&key) {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        slots.insert(key, tx);
        Some(rx)
    }

    /// Deliver a confirmation to the waiting operation. Returns `false`
    /// when nothing was waiting (late arrival after a timeout, or a
    /// confirmation nobody asked for).
    pub async fn resolve(
        &self,
        device_id: &str,
        kind: OperationKind,
        confirmation: Confirmation,
    ) -> bool {
        let sender = self
            .slots
            .lock()
            .await
            .remove(&(device_id.to_string(), kind));
        match sender {
            Some(tx) => tx.send(confirmation).is_ok(),
            None => false,
        }
    }

    /// Drop the slot after a timeout so the device can be retried.
    pub async fn abandon(&self, device_id: &str, kind: OperationKind) {
        if self
            .slots
            .lock()
            .await
            .remove(&(device_id.to_string(), kind))
            .is_some()
        {
            debug!(device_id, operation = kind.as_str(), "pending confirmation abandoned");
        }
    }
}
