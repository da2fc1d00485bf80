//! API key storage and format validation.
//!
//! The key lives in the store as a plain string under
//! `mutsumi_gemini_api_key`; once read it is only handled as a
//! [`SecretString`]. An override (the `GEMINI_API_KEY` environment
//! variable, supplied by the binary) takes precedence over the stored key.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use mutsumi_types::error::{StorageError, ValidationError};
use mutsumi_types::storage::keys;

use crate::storage::adapter::StoreAdapter;

/// Required prefix of a Gemini API key.
pub const API_KEY_PREFIX: &str = "AIza";

/// Required length of a Gemini API key.
pub const API_KEY_LEN: usize = 39;

/// Check the key's shape without contacting the service.
pub fn validate_api_key_format(key: &str) -> Result<(), ValidationError> {
    if key.starts_with(API_KEY_PREFIX) && key.encode_utf16().count() == API_KEY_LEN {
        Ok(())
    } else {
        Err(ValidationError::MalformedCredential)
    }
}

/// Show only the ends of a secret, e.g. `AIza...stuv`.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Whether a usable key is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Unset,
    Valid,
    Invalid,
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialStatus::Unset => write!(f, "unset"),
            CredentialStatus::Valid => write!(f, "valid"),
            CredentialStatus::Invalid => write!(f, "invalid"),
        }
    }
}

/// Errors saving a credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone)]
pub struct CredentialStore {
    store: StoreAdapter,
    override_key: Option<Arc<SecretString>>,
}

impl CredentialStore {
    pub fn new(store: StoreAdapter) -> Self {
        Self {
            store,
            override_key: None,
        }
    }

    /// Prefer `key` over whatever is stored. Blank overrides are ignored.
    pub fn with_override(mut self, key: Option<SecretString>) -> Self {
        self.override_key = key
            .filter(|k| !k.expose_secret().trim().is_empty())
            .map(Arc::new);
        self
    }

    pub fn is_overridden(&self) -> bool {
        self.override_key.is_some()
    }

    /// The active key, if it is well formed.
    ///
    /// A malformed key (stored or override) counts as no key, so it never
    /// reaches the network.
    pub async fn load(&self) -> Option<SecretString> {
        let key = self.configured().await?;
        match validate_api_key_format(key.expose_secret()) {
            Ok(()) => Some(key),
            Err(e) => {
                warn!(
                    key = %mask_secret(key.expose_secret()),
                    overridden = self.is_overridden(),
                    error = %e,
                    "ignoring malformed API key"
                );
                None
            }
        }
    }

    /// The configured key as found, well formed or not.
    pub async fn configured(&self) -> Option<SecretString> {
        if let Some(key) = &self.override_key {
            return Some(SecretString::from(key.expose_secret().trim().to_string()));
        }
        let stored = self.store.get(keys::GEMINI_API_KEY).await?;
        let trimmed = stored.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(SecretString::from(trimmed.to_string()))
    }

    pub async fn has_key(&self) -> bool {
        self.load().await.is_some()
    }

    /// Validate and store a key. Surrounding whitespace is dropped.
    pub async fn save(&self, raw: &str) -> Result<SecretString, CredentialError> {
        let key = raw.trim();
        validate_api_key_format(key)?;
        self.store.try_set(keys::GEMINI_API_KEY, key).await?;
        info!(key = %mask_secret(key), "API key saved");
        Ok(SecretString::from(key.to_string()))
    }

    pub async fn clear(&self) {
        self.store.remove(keys::GEMINI_API_KEY).await;
        info!("API key removed");
    }

    pub async fn status(&self) -> CredentialStatus {
        match self.configured().await {
            None => CredentialStatus::Unset,
            Some(key) => match validate_api_key_format(key.expose_secret()) {
                Ok(()) => CredentialStatus::Valid,
                Err(_) => CredentialStatus::Invalid,
            },
        }
    }
}
