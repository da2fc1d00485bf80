//! Key-value store trait.

use mutsumi_types::error::StorageError;
use mutsumi_types::storage::StoreMedium;

/// String key to string value persistent storage.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Every `set` is atomic per key: on failure the previous value is kept.
pub trait KvStore: Send + Sync {
    /// Which medium this store writes to.
    fn medium(&self) -> StoreMedium;

    /// Read a value. `None` if the key was never written or was removed.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Write a value, replacing any previous one.
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Delete a key. No-op if the key does not exist.
    fn remove(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Delete every key.
    fn clear(&self) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}
