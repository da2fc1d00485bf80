//! Application configuration types.
//!
//! `AppConfig` represents `config.toml` in the data directory. Every field
//! has a default, so a missing or partial file is valid.

use serde::{Deserialize, Serialize};

use crate::persona::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, PersonaProfile, MUTSUMI_SYSTEM_INSTRUCTION};

/// Default browser-like storage quota: 5 MiB.
pub const DEFAULT_STORAGE_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Top-level configuration, loaded from `~/.mutsumi/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Base URL of the generative-language API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total bytes all stored values may occupy. `None` disables the check.
    #[serde(default = "default_storage_quota")]
    pub storage_quota_bytes: Option<u64>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Overrides the built-in persona instruction.
    #[serde(default)]
    pub system_instruction: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_storage_quota() -> Option<u64> {
    Some(DEFAULT_STORAGE_QUOTA_BYTES)
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            base_url: default_base_url(),
            storage_quota_bytes: default_storage_quota(),
            request_timeout_secs: default_request_timeout(),
            system_instruction: None,
        }
    }
}

impl AppConfig {
    /// Persona profile described by this configuration.
    pub fn persona_profile(&self) -> PersonaProfile {
        PersonaProfile {
            system_instruction: self
                .system_instruction
                .clone()
                .unwrap_or_else(|| MUTSUMI_SYSTEM_INSTRUCTION.to_string()),
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }
}
