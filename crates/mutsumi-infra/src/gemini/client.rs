//! GeminiPersonaService -- `PersonaService` over `models/{model}:generateContent`.
//!
//! The API key travels as a [`SecretString`] and is only exposed when the
//! `x-goog-api-key` header is built.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use mutsumi_core::persona::box_service::BoxPersonaService;
use mutsumi_core::persona::service::{PersonaConnector, PersonaService};
use mutsumi_types::config::AppConfig;
use mutsumi_types::error::ConfigurationError;
use mutsumi_types::persona::{Part, PersonaError, PersonaProfile, PersonaReply, PersonaRequest};

use super::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Gemini-backed persona service. Not `Debug`: it holds the API key.
pub struct GeminiPersonaService {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiPersonaService {
    pub fn new(client: reqwest::Client, api_key: SecretString, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

impl PersonaService for GeminiPersonaService {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn send(&self, request: &PersonaRequest) -> Result<PersonaReply, PersonaError> {
        let body = GenerateContentRequest::from(request);

        let response = self
            .client
            .post(self.url(&request.model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| PersonaError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| PersonaError::Provider {
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(map_error(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| PersonaError::Deserialization(format!("failed to parse response: {e}")))?;

        match parsed.reply_text() {
            Some(text) => {
                tracing::debug!(chars = text.chars().count(), "gemini reply received");
                Ok(PersonaReply { text })
            }
            None => {
                let reason = parsed
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "none given".to_string());
                tracing::warn!(block_reason = %reason, "gemini returned no candidates");
                Err(PersonaError::EmptyResponse)
            }
        }
    }
}

/// Map a non-success HTTP response to a [`PersonaError`].
pub fn map_error(status: u16, body: &str) -> PersonaError {
    let (code, api_status, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => (
            env.error.code.unwrap_or(status),
            env.error.status.unwrap_or_default(),
            env.error.message,
        ),
        Err(_) => (status, String::new(), body.to_string()),
    };

    let key_rejected = code == 400 && message.contains("API key");
    if code == 401 || code == 403 || api_status == "UNAUTHENTICATED" || api_status == "PERMISSION_DENIED" || key_rejected {
        return PersonaError::AuthenticationFailed;
    }
    if code == 429 || api_status == "RESOURCE_EXHAUSTED" {
        return PersonaError::RateLimited;
    }
    PersonaError::Provider {
        message: format!("HTTP {code}: {message}"),
    }
}

/// Builds [`GeminiPersonaService`] clients sharing one configuration.
pub struct GeminiConnector {
    base_url: String,
    timeout: Duration,
}

impl GeminiConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

impl PersonaConnector for GeminiConnector {
    fn connect(&self, api_key: &SecretString) -> Result<BoxPersonaService, ConfigurationError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(ConfigurationError::MissingCredential);
        }
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ConfigurationError::Client(e.to_string()))?;

        let key = SecretString::from(api_key.expose_secret().to_string());
        Ok(BoxPersonaService::new(GeminiPersonaService::new(
            client,
            key,
            self.base_url.clone(),
        )))
    }
}

/// Check a key against the live API with a one-word request.
pub async fn verify_connection(
    service: &BoxPersonaService,
    profile: &PersonaProfile,
) -> Result<(), PersonaError> {
    let request = PersonaRequest {
        system_instruction: String::new(),
        model: profile.model.clone(),
        temperature: 0.0,
        history: Vec::new(),
        message: vec![Part::text("Hello")],
    };
    service.send(&request).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        let service = GeminiPersonaService::new(
            reqwest::Client::new(),
            SecretString::from("test-key-not-real"),
            "https://generativelanguage.googleapis.com/v1beta/".to_string(),
        );
        assert_eq!(
            service.url("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(service.name(), "gemini");
    }

    #[test]
    fn test_map_error_invalid_key() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        assert!(matches!(map_error(400, body), PersonaError::AuthenticationFailed));
        assert!(matches!(map_error(403, "forbidden"), PersonaError::AuthenticationFailed));
    }

    #[test]
    fn test_map_error_rate_limit() {
        let body = r#"{"error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(map_error(429, body), PersonaError::RateLimited));
    }

    #[test]
    fn test_map_error_other() {
        match map_error(500, "oops") {
            PersonaError::Provider { message } => assert_eq!(message, "HTTP 500: oops"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_connector_rejects_blank_key() {
        let connector = GeminiConnector::from_config(&AppConfig::default());
        assert!(matches!(
            connector.connect(&SecretString::from("  ")),
            Err(ConfigurationError::MissingCredential)
        ));
        let service = connector.connect(&SecretString::from("AIza-test")).unwrap();
        assert_eq!(service.name(), "gemini");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_provider_error() {
        let connector = GeminiConnector::new("http://127.0.0.1:9", Duration::from_secs(2));
        let service = connector.connect(&SecretString::from("AIza-test")).unwrap();
        let err = verify_connection(&service, &PersonaProfile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PersonaError::Provider { .. }));
    }
}
