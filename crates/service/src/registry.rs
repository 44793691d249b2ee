use std::collections::HashMap;

use models::ServiceInstance;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory map of instance ID to its record.
///
/// One reader/writer lock guards the whole map. Callers that must keep the
/// map stable across a backend round trip hold a [`RegistryWriteGuard`] for
/// the duration.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    inner: RwLock<HashMap<String, ServiceInstance>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `id`.
    pub async fn put(&self, id: &str, instance: ServiceInstance) {
        self.lock_exclusive().await.put(id, instance);
    }

    pub async fn get(&self, id: &str) -> Option<ServiceInstance> {
        self.lock_shared().await.get(id).cloned()
    }

    /// Delete the record for `id`; absent IDs are a no-op.
    pub async fn remove(&self, id: &str) -> Option<ServiceInstance> {
        self.lock_exclusive().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Sorted list of registered IDs.
    pub async fn ids(&self) -> Vec<String> {
        let map = self.inner.read().await;
        let mut ids: Vec<String> = map.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn lock_exclusive(&self) -> RegistryWriteGuard<'_> {
        RegistryWriteGuard(self.inner.write().await)
    }

    pub async fn lock_shared(&self) -> RegistryReadGuard<'_> {
        RegistryReadGuard(self.inner.read().await)
    }
}

/// Exclusive view of the registry.
pub struct RegistryWriteGuard<'a>(RwLockWriteGuard<'a, HashMap<String, ServiceInstance>>);

impl RegistryWriteGuard<'_> {
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ServiceInstance> {
        self.0.get(id)
    }

    pub fn put(&mut self, id: &str, instance: ServiceInstance) {
        self.0.insert(id.to_string(), instance);
    }

    pub fn remove(&mut self, id: &str) -> Option<ServiceInstance> {
        self.0.remove(id)
    }
}

/// Shared view of the registry.
pub struct RegistryReadGuard<'a>(RwLockReadGuard<'a, HashMap<String, ServiceInstance>>);

impl RegistryReadGuard<'_> {
    pub fn get(&self, id: &str) -> Option<&ServiceInstance> {
        self.0.get(id)
    }
}
