//! In-memory session list backed by the store adapter.
//!
//! Sessions are kept most-recently-active first. Every mutation is local;
//! callers decide when to [`SessionRepository::persist`].
//!
//! Stored entries that fail to parse are carried along untouched and written
//! back after the readable sessions, so a partial restore never erases them.

use std::collections::HashSet;

use mutsumi_types::message::Message;
use mutsumi_types::session::{Session, SessionId};
use mutsumi_types::storage::{PersistOutcome, keys};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::storage::adapter::StoreAdapter;

pub struct SessionRepository {
    store: StoreAdapter,
    sessions: Vec<Session>,
    unreadable: Vec<Value>,
}

impl SessionRepository {
    /// Empty repository over `store`. Call [`restore`](Self::restore) to load.
    pub fn new(store: StoreAdapter) -> Self {
        Self {
            store,
            sessions: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    /// Repository populated from whatever the store holds.
    pub async fn load(store: StoreAdapter) -> Self {
        let mut repo = Self::new(store);
        repo.restore().await;
        repo
    }

    pub fn store(&self) -> &StoreAdapter {
        &self.store
    }

    /// Sessions, most recently active first.
    pub fn list_sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == *id)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Append `message` to a session and move that session to the front.
    ///
    /// With no id a new session is started. An id that matches nothing also
    /// starts a session, under that id, so the caller's handle stays valid.
    /// Returns the id of the session that received the message.
    pub fn append_message(&mut self, id: Option<SessionId>, message: Message) -> SessionId {
        let Some(id) = id else {
            let session = Session::new(SessionId::new(), message);
            let id = session.id.clone();
            info!(session_id = %id, title = %session.title, "session created");
            self.sessions.insert(0, session);
            return id;
        };

        match self.sessions.iter().position(|s| s.id == id) {
            Some(idx) => {
                let mut session = self.sessions.remove(idx);
                session.push(message);
                self.sessions.insert(0, session);
            }
            None => {
                warn!(session_id = %id, "append to unknown session, creating it");
                self.sessions.insert(0, Session::new(id.clone(), message));
            }
        }
        id
    }

    /// Drop every session from memory. Storage is untouched until `persist`.
    pub fn clear(&mut self) {
        self.sessions.clear();
        self.unreadable.clear();
    }

    /// Stored entries kept verbatim because they did not parse.
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.len()
    }

    fn encode(&self, sessions: &[Session]) -> serde_json::Result<String> {
        let mut entries: Vec<Value> = sessions
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?;
        entries.extend(self.unreadable.iter().cloned());
        serde_json::to_string(&entries)
    }

    /// Write the full session list under the sessions key.
    ///
    /// If the write fails, retries once with every image payload removed.
    /// Nothing here panics or propagates; the outcome says what happened.
    pub async fn persist(&self) -> PersistOutcome {
        let json = match self.encode(&self.sessions) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize sessions");
                return PersistOutcome::Failed;
            }
        };

        let err = match self.store.try_set(keys::CHAT_SESSIONS, &json).await {
            Ok(()) => {
                debug!(sessions = self.sessions.len(), "sessions persisted");
                return PersistOutcome::Written;
            }
            Err(e) => e,
        };

        if !self.sessions.iter().any(Session::has_images) {
            warn!(error = %err, "failed to persist sessions");
            return PersistOutcome::Failed;
        }

        warn!(error = %err, "session write failed, retrying without images");
        let stripped: Vec<Session> = self.sessions.iter().map(Session::without_images).collect();
        let json = match self.encode(&stripped) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize sessions");
                return PersistOutcome::Failed;
            }
        };

        match self.store.try_set(keys::CHAT_SESSIONS, &json).await {
            Ok(()) => {
                info!(sessions = stripped.len(), "sessions persisted without images");
                PersistOutcome::DegradedWritten
            }
            Err(e) => {
                warn!(error = %e, "failed to persist sessions even without images");
                PersistOutcome::Failed
            }
        }
    }

    /// Replace the in-memory list with the stored one.
    ///
    /// Absent data or a value that is not a JSON array yields an empty list.
    /// Each entry is parsed on its own; unreadable entries are kept aside
    /// for the next persist. Returns the number of sessions loaded.
    pub async fn restore(&mut self) -> usize {
        self.sessions.clear();
        self.unreadable.clear();

        let Some(raw) = self.store.get(keys::CHAT_SESSIONS).await else {
            debug!("no stored sessions");
            return 0;
        };

        let entries: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "stored sessions are unreadable, starting empty");
                return 0;
            }
        };

        let mut seen = HashSet::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let session: Session = match serde_json::from_value(entry.clone()) {
                Ok(session) => session,
                Err(e) => {
                    warn!(index, error = %e, "stored session unreadable, keeping it as is");
                    self.unreadable.push(entry);
                    continue;
                }
            };
            if seen.insert(session.id.clone()) {
                self.sessions.push(session);
            } else {
                warn!(session_id = %session.id, "duplicate stored session dropped");
            }
        }

        info!(
            sessions = self.sessions.len(),
            unreadable = self.unreadable.len(),
            "sessions restored"
        );
        self.sessions.len()
    }
}
