//! Chat message types.
//!
//! A `Message` is one displayable line of a conversation: something the user
//! typed (optionally with an image), a persona reply, or a system notice.
//! Messages are immutable once created and owned by exactly one session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{RawId, string_id};

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct MessageId(String);

string_id!(MessageId);

/// Who produced a message.
///
/// The persona variant is stored as `"MUTSUMI"`, the spelling used by the
/// on-disk session layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "MUTSUMI", alias = "PERSONA")]
    Persona,
    #[serde(rename = "SYSTEM")]
    System,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "USER"),
            Sender::Persona => write!(f, "MUTSUMI"),
            Sender::System => write!(f, "SYSTEM"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Sender::User),
            "MUTSUMI" | "PERSONA" => Ok(Sender::Persona),
            "SYSTEM" => Ok(Sender::System),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    /// Marks a thought/search-process message rather than a spoken line.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_grounding: bool,
    /// Attached image as a base64 data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Message {
    fn with_sender(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            is_grounding: false,
            image: None,
        }
    }

    /// A message typed by the user, optionally carrying an image data URI.
    pub fn user(text: impl Into<String>, image: Option<String>) -> Self {
        Self {
            image,
            ..Self::with_sender(Sender::User, text)
        }
    }

    /// A reply spoken by the persona.
    pub fn persona(text: impl Into<String>) -> Self {
        Self::with_sender(Sender::Persona, text)
    }

    /// A system notice (never mirrored to the persona service).
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_sender(Sender::System, text)
    }

    /// Whether this message is part of the user/persona dialogue.
    pub fn is_dialogue(&self) -> bool {
        matches!(self.sender, Sender::User | Sender::Persona)
    }

    /// A copy of this message with any image payload removed.
    pub fn without_image(&self) -> Self {
        Self {
            image: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_roundtrip() {
        for sender in [Sender::User, Sender::Persona, Sender::System] {
            let s = sender.to_string();
            let parsed: Sender = s.parse().unwrap();
            assert_eq!(sender, parsed);
        }
    }

    #[test]
    fn test_sender_serde_uses_storage_spelling() {
        let json = serde_json::to_string(&Sender::Persona).unwrap();
        assert_eq!(json, "\"MUTSUMI\"");
        let parsed: Sender = serde_json::from_str("\"PERSONA\"").unwrap();
        assert_eq!(parsed, Sender::Persona);
    }

    #[test]
    fn test_message_serialize_camel_case_and_optional_fields() {
        let msg = Message::user("hi", None);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "USER");
        assert!(json.get("image").is_none());
        assert!(json.get("isGrounding").is_none());

        let with_image = Message::user("", Some("data:image/png;base64,aGk=".to_string()));
        let json = serde_json::to_value(&with_image).unwrap();
        assert_eq!(json["image"], "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_message_deserialize_with_grounding_flag() {
        let json = r#"{
            "id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "text": "thinking",
            "sender": "MUTSUMI",
            "timestamp": "2025-01-01T00:00:00Z",
            "isGrounding": true
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(msg.is_grounding);
        assert_eq!(msg.sender, Sender::Persona);
        assert!(msg.image.is_none());
    }

    #[test]
    fn test_message_ids_sort_in_creation_order() {
        let first = Message::persona("a");
        let second = Message::persona("b");
        assert!(first.id < second.id);
    }

    #[test]
    fn test_is_dialogue() {
        assert!(Message::user("x", None).is_dialogue());
        assert!(Message::persona("x").is_dialogue());
        assert!(!Message::system("x").is_dialogue());
    }

    #[test]
    fn test_without_image() {
        let msg = Message::user("look", Some("data:image/png;base64,aGk=".to_string()));
        let stripped = msg.without_image();
        assert!(stripped.image.is_none());
        assert_eq!(stripped.id, msg.id);
        assert_eq!(stripped.text, "look");
    }
}
