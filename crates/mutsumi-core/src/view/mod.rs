//! Conversation view state driven by the chat front-end.

pub mod conversation;
