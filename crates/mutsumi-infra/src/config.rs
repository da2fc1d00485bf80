//! Configuration loader.
//!
//! Reads `config.toml` from the data directory into [`AppConfig`]. A
//! missing or malformed file yields the defaults.

use std::path::Path;

use mutsumi_types::config::AppConfig;

/// Lowest accepted request timeout.
const MIN_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Load `{data_dir}/config.toml`, falling back to defaults.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "no config.toml, using defaults");
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!(path = %config_path.display(), error = %err, "failed to read config, using defaults");
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => sanitize(config),
        Err(err) => {
            tracing::warn!(path = %config_path.display(), error = %err, "failed to parse config, using defaults");
            AppConfig::default()
        }
    }
}

fn sanitize(mut config: AppConfig) -> AppConfig {
    if !(0.0..=2.0).contains(&config.temperature) {
        tracing::warn!(temperature = config.temperature, "temperature out of range, using default");
        config.temperature = AppConfig::default().temperature;
    }
    config.request_timeout_secs = config.request_timeout_secs.max(MIN_REQUEST_TIMEOUT_SECS);
    config.base_url = config.base_url.trim_end_matches('/').to_string();
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).await, AppConfig::default());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
model = "gemini-2.5-pro"
base_url = "http://localhost:8080/v1beta/"
storage_quota_bytes = 1024
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.storage_quota_bytes, Some(1024));
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "model = [unclosed")
            .await
            .unwrap();
        assert_eq!(load_config(tmp.path()).await, AppConfig::default());
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let config = sanitize(AppConfig {
            temperature: 7.0,
            request_timeout_secs: 0,
            ..AppConfig::default()
        });
        assert!((config.temperature - 0.85).abs() < f64::EPSILON);
        assert_eq!(config.request_timeout_secs, MIN_REQUEST_TIMEOUT_SECS);
    }
}
