//! ChatDispatch state machine.
//!
//! Sending is split into [`ChatDispatch::prepare`], [`PreparedTurn::execute`]
//! and [`ChatDispatch::commit`] so the remote call runs without borrowing
//! the dispatcher. Callers that do not need that can use
//! [`ChatDispatch::send`].

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{Instrument, debug, info, info_span, warn};

use mutsumi_types::error::{ConfigurationError, ValidationError};
use mutsumi_types::message::{Message, Sender};
use mutsumi_types::persona::{Part, PersonaError, PersonaProfile, PersonaReply, PersonaRequest, Turn};
use mutsumi_types::session::SessionId;

use super::attachment::parse_data_uri;
use super::context::ChatContext;
use crate::credential::{CredentialStore, validate_api_key_format};
use crate::persona::box_service::BoxPersonaService;
use crate::persona::service::PersonaConnector;

/// Reply shown when no client can be created.
pub const OFFLINE_PLACEHOLDER: &str = "离线协议已启动。";

/// Reply shown when the persona service call fails.
pub const PERSONA_APOLOGY: &str = "……";

/// Reply shown when the service answers with no text.
pub const EMPTY_REPLY: &str = "……";

/// Text sent alongside an image when the user typed nothing.
pub const IMAGE_PLACEHOLDER: &str = "（发送了一张图片）";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// No client; sends answer with the offline placeholder.
    Unconfigured,
    Ready,
    /// A prepared turn has not been committed yet.
    Awaiting,
}

/// What `prepare` decided.
pub enum Prepared {
    /// A remote call is needed.
    Remote(PreparedTurn),
    /// Answered locally, no network involved.
    Offline(Message),
}

/// A request ready to go out, detached from the dispatcher.
pub struct PreparedTurn {
    service: BoxPersonaService,
    request: PersonaRequest,
    user_turn: Turn,
    epoch: u64,
}

impl PreparedTurn {
    pub fn request(&self) -> &PersonaRequest {
        &self.request
    }

    /// Perform the single request/response exchange.
    pub async fn execute(self) -> TurnOutcome {
        let span = info_span!(
            "gen_ai.generate_content",
            gen_ai.system = self.service.name(),
            gen_ai.request.model = %self.request.model,
            gen_ai.request.temperature = self.request.temperature,
            gen_ai.request.history = self.request.history.len(),
        );
        let result = self.service.send(&self.request).instrument(span).await;
        TurnOutcome {
            user_turn: self.user_turn,
            epoch: self.epoch,
            result,
        }
    }
}

/// Result of an executed turn, waiting to be committed.
pub struct TurnOutcome {
    user_turn: Turn,
    epoch: u64,
    result: Result<PersonaReply, PersonaError>,
}

pub struct ChatDispatch {
    connector: Arc<dyn PersonaConnector>,
    credentials: CredentialStore,
    profile: PersonaProfile,
    client: Option<BoxPersonaService>,
    context: ChatContext,
    state: DispatchState,
}

impl ChatDispatch {
    /// Unconfigured dispatcher. The client is created lazily on first send
    /// from whatever key `credentials` holds.
    pub fn new(
        connector: Arc<dyn PersonaConnector>,
        credentials: CredentialStore,
        profile: PersonaProfile,
    ) -> Self {
        Self {
            connector,
            credentials,
            profile,
            client: None,
            context: ChatContext::default(),
            state: DispatchState::Unconfigured,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    pub fn profile(&self) -> &PersonaProfile {
        &self.profile
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Create the client from `api_key`.
    pub fn configure(&mut self, api_key: &SecretString) -> Result<(), ConfigurationError> {
        if let Err(e) = validate_api_key_format(api_key.expose_secret()) {
            warn!(error = %e, "refusing malformed API key");
            self.unconfigure();
            return Err(ConfigurationError::InvalidCredential(e.to_string()));
        }
        match self.connector.connect(api_key) {
            Ok(client) => {
                info!(backend = client.name(), "persona client configured");
                self.client = Some(client);
                if self.state == DispatchState::Unconfigured {
                    self.state = DispatchState::Ready;
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to configure persona client");
                self.unconfigure();
                Err(e)
            }
        }
    }

    /// Drop the client, e.g. after the key was removed.
    pub fn unconfigure(&mut self) {
        self.client = None;
        self.state = DispatchState::Unconfigured;
    }

    /// Discard the context and start unbound.
    pub fn reset(&mut self) {
        self.context = self.context.rebound(None, Vec::new());
        self.settle();
        debug!(epoch = self.context.epoch, "chat context reset");
    }

    /// Rebuild the context from a stored session and bind to it.
    ///
    /// Only user and persona messages become turns, text only.
    pub fn restore(&mut self, session_id: SessionId, messages: &[Message]) {
        let history = messages
            .iter()
            .filter(|m| m.is_dialogue())
            .map(|m| match m.sender {
                Sender::Persona => Turn::model(m.text.clone()),
                _ => Turn::user(vec![Part::text(m.text.clone())]),
            })
            .collect::<Vec<_>>();
        let turns = history.len();
        self.context = self.context.rebound(Some(session_id.clone()), history);
        self.settle();
        debug!(session_id = %session_id, turns, epoch = self.context.epoch, "chat context restored");
    }

    /// Bind an unbound context to the session it just started.
    ///
    /// Binding to the session already bound is a no-op. Binding away from a
    /// different session drops that session's history.
    pub fn bind(&mut self, session_id: SessionId) {
        match &self.context.bound_session {
            Some(bound) if *bound == session_id => {}
            Some(bound) => {
                warn!(from = %bound, to = %session_id, "rebinding chat context to another session");
                self.context = self.context.rebound(Some(session_id), Vec::new());
            }
            None => {
                let history = std::mem::take(&mut self.context.history);
                self.context = self.context.rebound(Some(session_id), history);
            }
        }
    }

    /// Validate input and build the request for one turn.
    pub async fn prepare(&mut self, text: &str, image: Option<&str>) -> Result<Prepared, ValidationError> {
        if text.trim().is_empty() && image.is_none() {
            return Err(ValidationError::EmptyMessage);
        }

        let Some(client) = self.ensure_client().await else {
            info!("no persona client, answering offline");
            return Ok(Prepared::Offline(Message::persona(OFFLINE_PLACEHOLDER)));
        };

        let mut parts = Vec::with_capacity(2);
        let mut with_image = false;
        if let Some(uri) = image {
            match parse_data_uri(uri) {
                Ok(inline) => {
                    parts.push(Part::from(inline));
                    with_image = true;
                }
                Err(e) => warn!(error = %e, "attachment dropped"),
            }
        }
        let text = if text.is_empty() && image.is_some() {
            IMAGE_PLACEHOLDER
        } else {
            text
        };
        parts.push(Part::text(text));

        let request = PersonaRequest::new(&self.profile, self.context.history.clone(), parts.clone());
        self.state = DispatchState::Awaiting;
        debug!(
            epoch = self.context.epoch,
            history = request.history.len(),
            with_image,
            "turn prepared"
        );

        Ok(Prepared::Remote(PreparedTurn {
            service: client,
            request,
            user_turn: Turn::user(parts),
            epoch: self.context.epoch,
        }))
    }

    /// Turn an executed turn into the persona's message.
    ///
    /// The exchange joins the context only if the context has not been
    /// rebound since the turn was prepared.
    pub fn commit(&mut self, outcome: TurnOutcome) -> Message {
        self.settle();
        match outcome.result {
            Ok(reply) => {
                let text = if reply.text.trim().is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    reply.text
                };
                if outcome.epoch == self.context.epoch {
                    self.context.history.push(outcome.user_turn);
                    self.context.history.push(Turn::model(text.clone()));
                } else {
                    debug!(
                        turn_epoch = outcome.epoch,
                        current_epoch = self.context.epoch,
                        "stale reply kept out of context"
                    );
                }
                Message::persona(text)
            }
            Err(e) => {
                warn!(error = %e, "persona call failed");
                Message::persona(PERSONA_APOLOGY)
            }
        }
    }

    /// Prepare, execute and commit in one go. Remote faults never escape.
    pub async fn send(&mut self, text: &str, image: Option<&str>) -> Result<Message, ValidationError> {
        match self.prepare(text, image).await? {
            Prepared::Offline(message) => Ok(message),
            Prepared::Remote(turn) => {
                let outcome = turn.execute().await;
                Ok(self.commit(outcome))
            }
        }
    }

    async fn ensure_client(&mut self) -> Option<BoxPersonaService> {
        if self.client.is_none() {
            let key = self.credentials.load().await?;
            self.configure(&key).ok()?;
        }
        self.client.clone()
    }

    fn settle(&mut self) {
        self.state = if self.client.is_some() {
            DispatchState::Ready
        } else {
            DispatchState::Unconfigured
        };
    }
}
