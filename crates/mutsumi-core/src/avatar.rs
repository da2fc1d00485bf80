//! User and character avatars, stored as image data URIs.

use mutsumi_types::error::{StorageError, ValidationError};
use mutsumi_types::storage::keys;
use thiserror::Error;
use tracing::{info, warn};

use crate::dispatch::attachment::parse_data_uri;
use crate::storage::adapter::StoreAdapter;

/// Whose avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSlot {
    User,
    Character,
}

impl AvatarSlot {
    fn key(self) -> &'static str {
        match self {
            AvatarSlot::User => keys::USER_AVATAR,
            AvatarSlot::Character => keys::CHARACTER_AVATAR,
        }
    }
}

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone)]
pub struct AvatarStore {
    store: StoreAdapter,
}

impl AvatarStore {
    pub fn new(store: StoreAdapter) -> Self {
        Self { store }
    }

    pub async fn get(&self, slot: AvatarSlot) -> Option<String> {
        self.store.get(slot.key()).await
    }

    /// Store an avatar. Only `data:image/...;base64,` URIs are accepted.
    ///
    /// A storage failure (quota included) is returned and the previous
    /// avatar, if any, stays in place.
    pub async fn set(&self, slot: AvatarSlot, data_uri: &str) -> Result<(), AvatarError> {
        let image = parse_data_uri(data_uri)?;
        if !image.mime_type.starts_with("image/") {
            return Err(ValidationError::MalformedDataUri.into());
        }
        if let Err(e) = self.store.try_set(slot.key(), data_uri).await {
            warn!(slot = ?slot, bytes = data_uri.len(), error = %e, "avatar not stored");
            return Err(e.into());
        }
        info!(slot = ?slot, mime = %image.mime_type, bytes = data_uri.len(), "avatar updated");
        Ok(())
    }

    pub async fn clear(&self, slot: AvatarSlot) {
        self.store.remove(slot.key()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MapStore;

    #[tokio::test]
    async fn test_set_get_clear() {
        let store = MapStore::new();
        let avatars = AvatarStore::new(store.adapter());
        let uri = "data:image/jpeg;base64,/9j/4AAQ";

        avatars.set(AvatarSlot::Character, uri).await.unwrap();
        assert_eq!(avatars.get(AvatarSlot::Character).await.as_deref(), Some(uri));
        assert_eq!(avatars.get(AvatarSlot::User).await, None);
        assert_eq!(store.raw(keys::CHARACTER_AVATAR).as_deref(), Some(uri));

        avatars.clear(AvatarSlot::Character).await;
        assert_eq!(avatars.get(AvatarSlot::Character).await, None);
    }

    #[tokio::test]
    async fn test_rejects_non_image_uri() {
        let avatars = AvatarStore::new(MapStore::new().adapter());
        assert!(matches!(
            avatars.set(AvatarSlot::User, "https://example.com/a.png").await,
            Err(AvatarError::Validation(ValidationError::MalformedDataUri))
        ));
        assert!(matches!(
            avatars.set(AvatarSlot::User, "data:text/plain;base64,aGk=").await,
            Err(AvatarError::Validation(ValidationError::MalformedDataUri))
        ));
    }

    #[tokio::test]
    async fn test_quota_failure_is_returned() {
        let small = "data:image/jpeg;base64,/9j/";
        let store = MapStore::with_quota(small.len() as u64);
        let avatars = AvatarStore::new(store.adapter());
        avatars.set(AvatarSlot::User, small).await.unwrap();

        let large = format!("data:image/jpeg;base64,{}", "A".repeat(4096));
        let err = avatars.set(AvatarSlot::User, &large).await.unwrap_err();
        assert!(matches!(err, AvatarError::Storage(ref e) if e.is_quota()));
        // previous avatar untouched
        assert_eq!(avatars.get(AvatarSlot::User).await.as_deref(), Some(small));
    }

    #[tokio::test]
    async fn test_backend_failure_is_returned() {
        let store = MapStore::new();
        store.fail_all(true);
        let avatars = AvatarStore::new(store.adapter());
        let err = avatars
            .set(AvatarSlot::Character, "data:image/jpeg;base64,/9j/4AAQ")
            .await
            .unwrap_err();
        assert!(matches!(err, AvatarError::Storage(_)));
    }
}
