//! Free-form user preferences and app settings, plus the data reset.

use serde_json::{Map, Value};
use tracing::{info, warn};

use mutsumi_types::storage::keys;

use crate::storage::adapter::StoreAdapter;

/// A JSON object stored under one key.
pub type Settings = Map<String, Value>;

#[derive(Clone)]
pub struct PreferenceStore {
    store: StoreAdapter,
}

impl PreferenceStore {
    pub fn new(store: StoreAdapter) -> Self {
        Self { store }
    }

    pub async fn user_preferences(&self) -> Settings {
        self.read(keys::USER_PREFERENCES).await
    }

    pub async fn set_user_preferences(&self, prefs: &Settings) {
        self.write(keys::USER_PREFERENCES, prefs).await;
    }

    pub async fn app_settings(&self) -> Settings {
        self.read(keys::APP_SETTINGS).await
    }

    pub async fn set_app_settings(&self, settings: &Settings) {
        self.write(keys::APP_SETTINGS, settings).await;
    }

    /// Absent or unreadable values read as an empty object.
    async fn read(&self, key: &str) -> Settings {
        let Some(raw) = self.store.get(key).await else {
            return Settings::new();
        };
        match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(key, error = %e, "stored settings are unreadable");
                Settings::new()
            }
        }
    }

    async fn write(&self, key: &str, settings: &Settings) {
        match serde_json::to_string(settings) {
            Ok(json) => self.store.set(key, &json).await,
            Err(e) => warn!(key, error = %e, "failed to serialize settings"),
        }
    }
}

/// Remove every key the application writes.
pub async fn clear_all_data(store: &StoreAdapter) {
    for key in keys::ALL_KEYS {
        store.remove(key).await;
    }
    info!(medium = %store.medium(), "all application data cleared");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MapStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_absent_reads_empty() {
        let prefs = PreferenceStore::new(MapStore::new().adapter());
        assert!(prefs.user_preferences().await.is_empty());
        assert!(prefs.app_settings().await.is_empty());
    }

    #[tokio::test]
    async fn test_roundtrip_and_corrupt() {
        let store = MapStore::new();
        let prefs = PreferenceStore::new(store.adapter());
        let mut settings = Settings::new();
        settings.insert("theme".to_string(), json!("dark"));
        prefs.set_app_settings(&settings).await;
        assert_eq!(prefs.app_settings().await, settings);

        store.put_raw(keys::USER_PREFERENCES, "[1, 2");
        assert!(prefs.user_preferences().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_data_keeps_foreign_keys() {
        let store = MapStore::new();
        for key in keys::ALL_KEYS {
            store.put_raw(key, "x");
        }
        store.put_raw("unrelated", "keep");

        clear_all_data(&store.adapter()).await;

        for key in keys::ALL_KEYS {
            assert_eq!(store.raw(key), None, "{key} should be removed");
        }
        assert_eq!(store.raw("unrelated").as_deref(), Some("keep"));
    }
}
