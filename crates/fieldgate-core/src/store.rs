//! Device and confirmation persistence seams.
//!
//! The gateway only ever talks to these traits; the in-memory
//! implementations back tests and single-process deployments, and a
//! database-backed engine can plug in without touching the callers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::model::{CertConfirmation, Device};

/// Keyed device storage.
pub trait DeviceStore: Send + Sync {
    fn get(&self, device_id: &str) -> impl Future<Output = Result<Option<Device>>> + Send;

    /// Insert a new device. Fails if the id is already registered.
    fn insert(&self, device: Device) -> impl Future<Output = Result<()>> + Send;

    /// Atomic read-modify-write of an existing device record.
    fn update(
        &self,
        device_id: &str,
        f: impl FnOnce(&mut Device) + Send,
    ) -> impl Future<Output = Result<Device>> + Send;

    /// Insert or overwrite, for onboarding re-registration.
    fn upsert(&self, device: Device) -> impl Future<Output = Result<()>> + Send;

    fn remove(&self, device_id: &str) -> impl Future<Output = Result<Option<Device>>> + Send;

    fn list_ids(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Append-only record of certificate operation confirmations.
pub trait ConfirmationStore: Send + Sync {
    fn append(&self, confirmation: CertConfirmation) -> impl Future<Output = Result<()>> + Send;

    fn for_device(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<Vec<CertConfirmation>>> + Send;
}

/// `HashMap` behind a `tokio::sync::RwLock`.
#[derive(Default, Clone)]
pub struct MemoryDeviceStore {
    devices: Arc<RwLock<HashMap<String, Device>>>,
}

impl MemoryDeviceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStore for MemoryDeviceStore {
    async fn get(&self, device_id: &str) -> Result<Option<Device>> {
        Ok(self.devices.read().await.get(device_id).cloned())
    }

    async fn insert(&self, device: Device) -> Result<()> {
        let mut devices = self.devices.write().await;
        if devices.contains_key(&device.device_id) {
            return Err(Error::DeviceExists(device.device_id));
        }
        devices.insert(device.device_id.clone(), device);
        Ok(())
    }

    async fn update(&self, device_id: &str, f: impl FnOnce(&mut Device) + Send) -> Result<Device> {
        let mut devices = self.devices.write().await;
        let device = devices
            .get_mut(device_id)
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;
        f(device);
        Ok(device.clone())
    }

    async fn upsert(&self, device: Device) -> Result<()> {
        self.devices
            .write()
            .await
            .insert(device.device_id.clone(), device);
        Ok(())
    }

    async fn remove(&self, device_id: &str) -> Result<Option<Device>> {
        Ok(self.devices.write().await.remove(device_id))
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        Ok(self.devices.read().await.keys().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct MemoryConfirmationStore {
    confirmations: Arc<RwLock<Vec<CertConfirmation>>>,
}

impl MemoryConfirmationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfirmationStore for MemoryConfirmationStore {
    async fn append(&self, confirmation: CertConfirmation) -> Result<()> {
        self.confirmations.write().await.push(confirmation);
        Ok(())
    }

    async fn for_device(&self, device_id: &str) -> Result<Vec<CertConfirmation>> {
        Ok(self
            .confirmations
            .read()
            .await
            .iter()
            .filter(|c| c.device_id == device_id)
            .cloned()
            .collect())
    }
}
