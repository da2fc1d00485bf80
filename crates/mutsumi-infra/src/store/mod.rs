//! Storage medium selection.
//!
//! At startup the durable SQLite file in the data directory is preferred.
//! If it cannot be opened, a process-scoped SQLite database in a temporary
//! directory is used; failing that, a plain in-memory map.

pub mod memory;

use std::path::Path;

use tempfile::TempDir;
use tracing::{info, warn};

use mutsumi_core::storage::adapter::StoreAdapter;
use mutsumi_core::storage::box_store::BoxKvStore;
use mutsumi_types::error::StorageError;
use mutsumi_types::storage::StoreMedium;

use crate::sqlite::kv::SqliteKvStore;
use crate::sqlite::pool::DatabasePool;

use self::memory::MemoryKvStore;

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "mutsumi.db";

/// The store chosen at startup.
///
/// Holds the temporary directory of a process-scoped store; it is deleted
/// when this value drops.
pub struct SelectedStore {
    pub adapter: StoreAdapter,
    pub medium: StoreMedium,
    _scratch: Option<TempDir>,
}

/// Pick the best available medium.
pub async fn select_store(data_dir: &Path, quota: Option<u64>) -> SelectedStore {
    match open_durable(data_dir, quota).await {
        Ok(store) => return selected(store, None),
        Err(e) => warn!(path = %data_dir.display(), error = %e, "durable store unavailable"),
    }

    match open_scratch(quota).await {
        Ok((store, dir)) => return selected(store, Some(dir)),
        Err(e) => warn!(error = %e, "process-scoped store unavailable"),
    }

    selected(MemoryKvStore::new(quota), None)
}

fn selected<S>(store: S, scratch: Option<TempDir>) -> SelectedStore
where
    S: mutsumi_core::storage::kv_store::KvStore + 'static,
{
    let medium = store.medium();
    info!(%medium, "storage medium selected");
    SelectedStore {
        adapter: StoreAdapter::new(BoxKvStore::new(store)),
        medium,
        _scratch: scratch,
    }
}

/// Open the durable store at `{data_dir}/mutsumi.db`.
pub async fn open_durable(data_dir: &Path, quota: Option<u64>) -> Result<SqliteKvStore, StorageError> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;
    let pool = DatabasePool::open(&data_dir.join(DATABASE_FILE))
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;
    Ok(SqliteKvStore::new(pool, StoreMedium::Durable, quota))
}

/// Open a store in a fresh temporary directory.
async fn open_scratch(quota: Option<u64>) -> Result<(SqliteKvStore, TempDir), StorageError> {
    let dir = tempfile::Builder::new()
        .prefix("mutsumi-session-")
        .tempdir()
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;
    let pool = DatabasePool::open(&dir.path().join(DATABASE_FILE))
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;
    Ok((SqliteKvStore::new(pool, StoreMedium::Session, quota), dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prefers_durable() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");

        let selected = select_store(&data_dir, None).await;
        assert_eq!(selected.medium, StoreMedium::Durable);
        assert!(data_dir.join(DATABASE_FILE).exists());

        selected.adapter.set("k", "v").await;
        drop(selected);

        let reopened = select_store(&data_dir, None).await;
        assert_eq!(reopened.adapter.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_falls_back_when_data_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let selected = select_store(&blocker, None).await;
        assert_ne!(selected.medium, StoreMedium::Durable);

        selected.adapter.set("k", "v").await;
        assert_eq!(selected.adapter.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_selected_store_honours_quota() {
        let dir = tempfile::tempdir().unwrap();
        let selected = select_store(dir.path(), Some(3)).await;
        let err = selected.adapter.try_set("k", "four").await.unwrap_err();
        assert!(err.is_quota());
    }
}
