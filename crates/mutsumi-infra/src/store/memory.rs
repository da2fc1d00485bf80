//! In-memory key-value store, the last-resort medium.

use std::sync::Mutex;

use dashmap::DashMap;

use mutsumi_core::storage::kv_store::KvStore;
use mutsumi_types::error::StorageError;
use mutsumi_types::storage::StoreMedium;

/// DashMap-backed store. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryKvStore {
    values: DashMap<String, String>,
    quota: Option<u64>,
    /// Serializes writes so the quota check and the insert are one step.
    write_lock: Mutex<()>,
}

impl MemoryKvStore {
    pub fn new(quota: Option<u64>) -> Self {
        Self {
            quota,
            ..Self::default()
        }
    }

    fn used_except(&self, key: &str) -> u64 {
        self.values
            .iter()
            .filter(|entry| entry.key() != key)
            .map(|entry| entry.value().len() as u64)
            .sum()
    }
}

impl KvStore for MemoryKvStore {
    fn medium(&self) -> StoreMedium {
        StoreMedium::Memory
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))?;

        if let Some(quota) = self.quota {
            let needed = self.used_except(key) + value.len() as u64;
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.values.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let store = MemoryKvStore::new(None);
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quota() {
        let store = MemoryKvStore::new(Some(4));
        store.set("a", "abcd").await.unwrap();
        assert!(store.set("b", "e").await.unwrap_err().is_quota());
        assert_eq!(store.get("b").await.unwrap(), None);
        store.set("a", "ab").await.unwrap();
        store.set("b", "cd").await.unwrap();
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryKvStore::new(None);
        store.set("a", "1").await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.medium(), StoreMedium::Memory);
    }
}
