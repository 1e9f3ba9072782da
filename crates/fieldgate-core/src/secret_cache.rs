//! In-memory cache of per-device ECDH shared secrets.
//!
//! The persisted device record is authoritative; this cache only saves a
//! store round-trip on the telemetry hot path. Entries are zeroized when
//! dropped or replaced.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use zeroize::Zeroizing;

pub const SECRET_LEN: usize = 32;

#[derive(Default, Clone)]
pub struct SharedSecretCache {
    secrets: Arc<RwLock<HashMap<String, Zeroizing<[u8; SECRET_LEN]>>>>,
}

impl SharedSecretCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, device_id: &str, secret: [u8; SECRET_LEN]) {
        self.secrets
            .write()
            .await
            .insert(device_id.to_string(), Zeroizing::new(secret));
    }

    /// Owned zeroizing copy, or None on a cache miss.
    pub async fn get(&self, device_id: &str) -> Option<Zeroizing<[u8; SECRET_LEN]>> {
        self.secrets.read().await.get(device_id).cloned()
    }

    pub async fn remove(&self, device_id: &str) {
        self.secrets.write().await.remove(device_id);
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = SharedSecretCache::new();
        assert!(cache.get("aa:bb").await.is_none());
        cache.insert("aa:bb", [7u8; 32]).await;
        assert_eq!(cache.get("aa:bb").await.unwrap().as_slice(), &[7u8; 32]);
    }

    #[tokio::test]
    async fn insert_replaces_previous_secret() {
        let cache = SharedSecretCache::new();
        cache.insert("aa:bb", [1u8; 32]).await;
        cache.insert("aa:bb", [2u8; 32]).await;
        assert_eq!(cache.get("aa:bb").await.unwrap().as_slice(), &[2u8; 32]);
    }

    #[tokio::test]
    async fn remove_clears_entry() {
        let cache = SharedSecretCache::new();
        cache.insert("aa:bb", [1u8; 32]).await;
        cache.remove("aa:bb").await;
        assert!(cache.get("aa:bb").await.is_none());
    }
}
