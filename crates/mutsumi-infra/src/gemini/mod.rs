//! Gemini persona service.
//!
//! [`GeminiConnector`] implements `PersonaConnector`; the services it hands
//! out implement `PersonaService` over the `generateContent` endpoint.

pub mod client;
pub mod types;

pub use client::{GeminiConnector, GeminiPersonaService, verify_connection};
