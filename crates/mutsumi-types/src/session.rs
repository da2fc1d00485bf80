//! Session types.
//!
//! A session is one titled conversation. Sessions are ordered
//! most-recently-modified first by the repository that owns them.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{RawId, string_id};
use crate::message::Message;

/// Title given to a session whose first message has no text.
pub const DEFAULT_SESSION_TITLE: &str = "新对话";

/// Maximum length of a derived title, in UTF-16 code units.
pub const TITLE_MAX_UNITS: usize = 20;

/// Unique identifier for a session.
///
/// Opaque: stored ids are kept exactly as read, numeric ones as their
/// decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct SessionId(String);

string_id!(SessionId);

/// A titled conversation with its ordered messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    /// Stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Session {
    /// Start a session whose title is derived from its first message.
    pub fn new(id: SessionId, first: Message) -> Self {
        Self {
            id,
            title: derive_title(&first.text),
            last_modified: now_millis(),
            messages: vec![first],
        }
    }

    /// Append a message and refresh the modification time.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    /// Refresh the modification time.
    pub fn touch(&mut self) {
        self.last_modified = now_millis();
    }

    /// A copy of this session with every image payload removed.
    pub fn without_images(&self) -> Self {
        Self {
            messages: self.messages.iter().map(Message::without_image).collect(),
            ..self.clone()
        }
    }

    /// Whether any message carries an image.
    pub fn has_images(&self) -> bool {
        self.messages.iter().any(|m| m.image.is_some())
    }
}

/// Current time truncated to the millisecond precision used on disk.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Derive a session title from message text.
///
/// Takes the first [`TITLE_MAX_UNITS`] UTF-16 code units, never splitting a
/// character. Empty text yields [`DEFAULT_SESSION_TITLE`].
pub fn derive_title(text: &str) -> String {
    if text.is_empty() {
        return DEFAULT_SESSION_TITLE.to_string();
    }
    truncate_utf16(text, TITLE_MAX_UNITS).to_string()
}

/// Longest prefix of `text` that fits in `max_units` UTF-16 code units.
pub fn truncate_utf16(text: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return &text[..idx];
        }
    }
    text
}
