//! Persona service port.
//!
//! Implementations (the Gemini client) live in mutsumi-infra.

pub mod box_service;
pub mod service;
