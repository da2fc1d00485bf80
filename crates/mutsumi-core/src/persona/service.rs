//! PersonaService and PersonaConnector trait definitions.

use secrecy::SecretString;

use mutsumi_types::error::ConfigurationError;
use mutsumi_types::persona::{PersonaError, PersonaReply, PersonaRequest};

use super::box_service::BoxPersonaService;

/// A remote service that answers in the persona's voice.
///
/// One call is one request/response exchange carrying the full context;
/// the service keeps no state between calls.
pub trait PersonaService: Send + Sync {
    /// Short backend name for logs (e.g. "gemini").
    fn name(&self) -> &str;

    fn send(
        &self,
        request: &PersonaRequest,
    ) -> impl std::future::Future<Output = Result<PersonaReply, PersonaError>> + Send;
}

/// Builds a persona service client from a credential.
///
/// Connecting performs no network I/O; a bad key only shows up on the
/// first `send`.
pub trait PersonaConnector: Send + Sync {
    fn connect(&self, api_key: &SecretString) -> Result<BoxPersonaService, ConfigurationError>;
}
