//! What the user currently sees, and the actions that change it.
//!
//! A send is split in three so the front-end can render the user's message
//! (and a spinner) before the remote call, and keep handling input while it
//! runs:
//!
//! 1. [`ConversationView::begin_send`] records the user message, persists
//!    it and prepares the turn.
//! 2. [`PendingSend::run`] performs the remote call without the view.
//! 3. [`ConversationView::finish_send`] files the reply under the session
//!    the send started in.

use tracing::{debug, info, warn};

use mutsumi_types::message::Message;
use mutsumi_types::session::SessionId;
use mutsumi_types::storage::PersistOutcome;

use crate::dispatch::dispatcher::{ChatDispatch, Prepared, PreparedTurn, TurnOutcome};
use crate::session::repository::SessionRepository;

/// First line of a new conversation.
pub const GREETING: &str = "……我在。";

/// Shown after the first API key is configured.
pub const WELCOME_BACK: &str = "……欢迎回来。";

pub struct ConversationView {
    repository: SessionRepository,
    dispatch: ChatDispatch,
    messages: Vec<Message>,
    active_session: Option<SessionId>,
    loading: bool,
    attachment: Option<String>,
}

/// A send in flight.
pub struct PendingSend {
    session_id: SessionId,
    work: PendingWork,
}

enum PendingWork {
    Remote(PreparedTurn),
    Offline(Message),
}

/// A finished remote call (or an offline reply), ready to be filed.
pub struct CompletedSend {
    session_id: SessionId,
    result: CompletedWork,
}

enum CompletedWork {
    Remote(TurnOutcome),
    Offline(Message),
}

impl PendingSend {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Whether this send needs the network.
    pub fn is_remote(&self) -> bool {
        matches!(self.work, PendingWork::Remote(_))
    }

    pub async fn run(self) -> CompletedSend {
        let result = match self.work {
            PendingWork::Remote(turn) => CompletedWork::Remote(turn.execute().await),
            PendingWork::Offline(message) => CompletedWork::Offline(message),
        };
        CompletedSend {
            session_id: self.session_id,
            result,
        }
    }
}

impl ConversationView {
    /// Build the view over an already-loaded repository.
    ///
    /// With no stored sessions the view opens on the greeting; otherwise it
    /// opens empty with no session selected.
    pub fn open(repository: SessionRepository, dispatch: ChatDispatch) -> Self {
        let messages = if repository.is_empty() {
            vec![Message::persona(GREETING)]
        } else {
            Vec::new()
        };
        Self {
            repository,
            dispatch,
            messages,
            active_session: None,
            loading: false,
            attachment: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn active_session(&self) -> Option<&SessionId> {
        self.active_session.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref()
    }

    pub fn repository(&self) -> &SessionRepository {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut SessionRepository {
        &mut self.repository
    }

    pub fn dispatch(&self) -> &ChatDispatch {
        &self.dispatch
    }

    pub fn dispatch_mut(&mut self) -> &mut ChatDispatch {
        &mut self.dispatch
    }

    /// Leave the current session and start over on the greeting.
    pub fn new_chat(&mut self) {
        self.active_session = None;
        self.messages = vec![Message::persona(GREETING)];
        self.dispatch.reset();
        info!("new chat started");
    }

    /// Show a stored session and rebuild the context from it.
    ///
    /// Returns false (and changes nothing) for an unknown id.
    pub fn select_session(&mut self, id: SessionId) -> bool {
        let Some(session) = self.repository.get(&id) else {
            warn!(session_id = %id, "select of unknown session");
            return false;
        };
        self.messages = session.messages.clone();
        self.dispatch.restore(id.clone(), &session.messages);
        info!(session_id = %id, messages = self.messages.len(), "session selected");
        self.active_session = Some(id);
        true
    }

    /// Replace the visible list with the welcome line.
    pub fn welcome(&mut self) {
        self.messages = vec![Message::persona(WELCOME_BACK)];
    }

    pub fn attach(&mut self, data_uri: String) {
        self.attachment = Some(data_uri);
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    /// Whether `text` (plus any attachment) may be sent right now.
    pub fn can_send(&self, text: &str) -> bool {
        !self.loading && (!text.trim().is_empty() || self.attachment.is_some())
    }

    /// Record the user's message and prepare its turn.
    ///
    /// Returns `None` (a no-op) while another send is outstanding or when
    /// there is nothing to send. The user message is persisted before this
    /// returns.
    pub async fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if !self.can_send(text) {
            debug!(loading = self.loading, "send ignored");
            return None;
        }

        self.loading = true;
        let image = self.attachment.take();
        let user_message = Message::user(text, image.clone());
        self.messages.push(user_message.clone());

        let session_id = self
            .repository
            .append_message(self.active_session.clone(), user_message);
        self.active_session = Some(session_id.clone());
        self.dispatch.bind(session_id.clone());
        self.persist().await;

        let work = match self.dispatch.prepare(text, image.as_deref()).await {
            Ok(Prepared::Remote(turn)) => PendingWork::Remote(turn),
            Ok(Prepared::Offline(message)) => PendingWork::Offline(message),
            Err(e) => {
                // can_send already ruled this out
                warn!(error = %e, "turn rejected");
                self.loading = false;
                return None;
            }
        };

        Some(PendingSend { session_id, work })
    }

    /// File the reply under the session the send started in.
    ///
    /// The reply is shown only if that session is still the active one.
    /// Loading is cleared whatever happened.
    pub async fn finish_send(&mut self, completed: CompletedSend) -> Message {
        let reply = match completed.result {
            CompletedWork::Remote(outcome) => self.dispatch.commit(outcome),
            CompletedWork::Offline(message) => message,
        };

        self.repository
            .append_message(Some(completed.session_id.clone()), reply.clone());
        self.persist().await;

        if self.active_session.as_ref() == Some(&completed.session_id) {
            self.messages.push(reply.clone());
        } else {
            debug!(session_id = %completed.session_id, "reply filed under inactive session");
        }
        self.loading = false;
        reply
    }

    /// `begin_send`, `run` and `finish_send` back to back.
    pub async fn send(&mut self, text: &str) -> Option<Message> {
        let pending = self.begin_send(text).await?;
        let completed = pending.run().await;
        Some(self.finish_send(completed).await)
    }

    async fn persist(&self) -> PersistOutcome {
        let outcome = self.repository.persist().await;
        if outcome != PersistOutcome::Written {
            warn!(outcome = %outcome, "session history not fully saved");
        }
        outcome
    }
}
