//! Storage medium and key definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which backing medium a store writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreMedium {
    /// Survives restarts.
    Durable,
    /// Lives for the current process only.
    Session,
    /// Plain in-memory map.
    Memory,
}

impl fmt::Display for StoreMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreMedium::Durable => write!(f, "durable"),
            StoreMedium::Session => write!(f, "session"),
            StoreMedium::Memory => write!(f, "memory"),
        }
    }
}

/// Well-known storage keys.
pub mod keys {
    pub const CHAT_SESSIONS: &str = "mutsumi_chat_sessions";
    pub const USER_AVATAR: &str = "mutsumi_user_avatar";
    pub const CHARACTER_AVATAR: &str = "mutsumi_character_avatar";
    pub const GEMINI_API_KEY: &str = "mutsumi_gemini_api_key";
    pub const USER_PREFERENCES: &str = "mutsumi_user_preferences";
    pub const APP_SETTINGS: &str = "mutsumi_app_settings";

    /// Every key the application writes.
    pub const ALL_KEYS: [&str; 6] = [
        CHAT_SESSIONS,
        USER_AVATAR,
        CHARACTER_AVATAR,
        GEMINI_API_KEY,
        USER_PREFERENCES,
        APP_SETTINGS,
    ];
}

/// Result of persisting the session list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistOutcome {
    /// Everything was written.
    Written,
    /// Written only after image payloads were stripped.
    DegradedWritten,
    /// Nothing could be written.
    Failed,
}

impl fmt::Display for PersistOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistOutcome::Written => write!(f, "written"),
            PersistOutcome::DegradedWritten => write!(f, "written without images"),
            PersistOutcome::Failed => write!(f, "failed"),
        }
    }
}
