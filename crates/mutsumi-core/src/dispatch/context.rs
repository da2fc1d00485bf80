//! The conversation context mirrored to the persona service.

use mutsumi_types::persona::Turn;
use mutsumi_types::session::SessionId;

/// Turns already exchanged, and which session they belong to.
///
/// `epoch` changes every time the context is rebound, so a reply computed
/// against an older binding can be recognised and kept out of the history.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub history: Vec<Turn>,
    pub bound_session: Option<SessionId>,
    pub epoch: u64,
}

impl ChatContext {
    /// Fresh context one epoch after `self`.
    pub fn rebound(&self, session: Option<SessionId>, history: Vec<Turn>) -> Self {
        Self {
            history,
            bound_session: session,
            epoch: self.epoch.wrapping_add(1),
        }
    }
}
