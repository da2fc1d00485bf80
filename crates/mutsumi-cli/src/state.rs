//! Application state wiring the stores and the persona client together.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use mutsumi_core::avatar::AvatarStore;
use mutsumi_core::credential::CredentialStore;
use mutsumi_core::dispatch::dispatcher::ChatDispatch;
use mutsumi_core::persona::service::PersonaConnector;
use mutsumi_core::preferences::PreferenceStore;
use mutsumi_core::session::repository::SessionRepository;
use mutsumi_core::storage::adapter::StoreAdapter;
use mutsumi_core::view::conversation::ConversationView;
use mutsumi_infra::config::load_config;
use mutsumi_infra::filesystem::resolve_data_dir;
use mutsumi_infra::gemini::GeminiConnector;
use mutsumi_infra::store::{SelectedStore, select_store};
use mutsumi_types::config::AppConfig;
use mutsumi_types::storage::StoreMedium;

/// Everything a command needs, built once at startup.
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub credentials: CredentialStore,
    pub avatars: AvatarStore,
    pub preferences: PreferenceStore,
    pub connector: Arc<GeminiConnector>,
    store: SelectedStore,
}

impl AppState {
    /// Resolve the data dir, load config and open the best available store.
    ///
    /// `api_key_override` (from `--api-key` / `GEMINI_API_KEY`) takes
    /// precedence over the stored key without being written anywhere.
    pub async fn init(api_key_override: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await;
        let store = select_store(&data_dir, config.storage_quota_bytes).await;

        let credentials = CredentialStore::new(store.adapter.clone())
            .with_override(api_key_override.map(SecretString::from));
        let avatars = AvatarStore::new(store.adapter.clone());
        let preferences = PreferenceStore::new(store.adapter.clone());
        let connector = Arc::new(GeminiConnector::from_config(&config));

        Ok(Self {
            data_dir,
            config,
            credentials,
            avatars,
            preferences,
            connector,
            store,
        })
    }

    pub fn adapter(&self) -> &StoreAdapter {
        &self.store.adapter
    }

    pub fn medium(&self) -> StoreMedium {
        self.store.medium
    }

    /// Load the stored sessions.
    pub async fn repository(&self) -> SessionRepository {
        SessionRepository::load(self.store.adapter.clone()).await
    }

    /// A fresh dispatcher; it connects lazily on the first send.
    pub fn dispatch(&self) -> ChatDispatch {
        let connector: Arc<dyn PersonaConnector> = self.connector.clone();
        ChatDispatch::new(
            connector,
            self.credentials.clone(),
            self.config.persona_profile(),
        )
    }

    /// Open the conversation view over the stored sessions.
    pub async fn open_view(&self) -> ConversationView {
        ConversationView::open(self.repository().await, self.dispatch())
    }
}
