//! BoxKvStore -- object-safe dynamic dispatch wrapper for KvStore.
//!
//! `KvStoreDyn` boxes the futures, is blanket-implemented for every
//! `T: KvStore`, and `BoxKvStore` delegates to it.

use std::future::Future;
use std::pin::Pin;

use mutsumi_types::error::StorageError;
use mutsumi_types::storage::StoreMedium;

use super::kv_store::KvStore;

type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Object-safe version of [`KvStore`] with boxed futures.
pub trait KvStoreDyn: Send + Sync {
    fn medium(&self) -> StoreMedium;

    fn get_boxed<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    fn set_boxed<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()>;

    fn remove_boxed<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;

    fn clear_boxed(&self) -> StoreFuture<'_, ()>;
}

impl<T: KvStore> KvStoreDyn for T {
    fn medium(&self) -> StoreMedium {
        KvStore::medium(self)
    }

    fn get_boxed<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(self.get(key))
    }

    fn set_boxed<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(self.set(key, value))
    }

    fn remove_boxed<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(self.remove(key))
    }

    fn clear_boxed(&self) -> StoreFuture<'_, ()> {
        Box::pin(self.clear())
    }
}

/// Type-erased key-value store, chosen at startup by medium selection.
pub struct BoxKvStore {
    inner: Box<dyn KvStoreDyn + Send + Sync>,
}

impl BoxKvStore {
    /// Wrap a concrete `KvStore`.
    pub fn new<T: KvStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    pub fn medium(&self) -> StoreMedium {
        self.inner.medium()
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_boxed(key).await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_boxed(key, value).await
    }

    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_boxed(key).await
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear_boxed().await
    }
}
