//! Domain types for the Mutsumi persona chat.
//!
//! Messages, sessions, persona request shapes, configuration, storage keys
//! and the error enums every other crate speaks in. No I/O lives here.

pub mod config;
pub mod error;
mod id;
pub mod message;
pub mod persona;
pub mod session;
pub mod storage;
