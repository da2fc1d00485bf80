//! Best-effort storage adapter.
//!
//! Every read and write goes through [`StoreAdapter`]. Faults from the
//! underlying medium are logged and never surface to callers, except
//! through [`StoreAdapter::try_set`], which lets a caller react to
//! capacity failures.

use std::sync::Arc;

use mutsumi_types::error::StorageError;
use mutsumi_types::storage::StoreMedium;
use tracing::{debug, warn};

use super::box_store::BoxKvStore;

/// Cheaply cloneable handle over the selected storage medium.
#[derive(Clone)]
pub struct StoreAdapter {
    store: Arc<BoxKvStore>,
}

impl StoreAdapter {
    pub fn new(store: BoxKvStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn medium(&self) -> StoreMedium {
        self.store.medium()
    }

    /// Read a value; any fault reads as absent.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    /// Write a value; faults are logged and dropped.
    pub async fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.try_set(key, value).await {
            warn!(key, error = %e, "storage write failed");
        }
    }

    /// Write a value and report the fault, if any.
    pub async fn try_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set(key, value).await?;
        debug!(key, bytes = value.len(), "storage write");
        Ok(())
    }

    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            warn!(key, error = %e, "storage remove failed");
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "storage clear failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MapStore;

    #[tokio::test]
    async fn test_roundtrip() {
        let adapter = StoreAdapter::new(BoxKvStore::new(MapStore::new()));
        assert_eq!(adapter.get("k").await, None);
        adapter.set("k", "v").await;
        assert_eq!(adapter.get("k").await.as_deref(), Some("v"));
        adapter.remove("k").await;
        assert_eq!(adapter.get("k").await, None);
    }

    #[tokio::test]
    async fn test_faults_are_swallowed() {
        let store = MapStore::new();
        store.fail_all(true);
        let adapter = StoreAdapter::new(BoxKvStore::new(store));

        assert_eq!(adapter.get("k").await, None);
        adapter.set("k", "v").await;
        adapter.remove("k").await;
        adapter.clear().await;
    }

    #[tokio::test]
    async fn test_try_set_reports_quota() {
        let adapter = StoreAdapter::new(BoxKvStore::new(MapStore::with_quota(4)));
        adapter.set("a", "old").await;

        let err = adapter.try_set("a", "too long").await.unwrap_err();
        assert!(err.is_quota());
        assert_eq!(adapter.get("a").await.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let adapter = StoreAdapter::new(BoxKvStore::new(MapStore::new()));
        adapter.set("a", "1").await;
        adapter.set("b", "2").await;
        adapter.clear().await;
        assert_eq!(adapter.get("a").await, None);
        assert_eq!(adapter.get("b").await, None);
        assert_eq!(adapter.medium(), StoreMedium::Memory);
    }
}
