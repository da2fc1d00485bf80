//! Infrastructure for the Mutsumi persona chat.
//!
//! Implements the `mutsumi-core` ports: SQLite and in-memory key-value
//! stores with startup medium selection, and the Gemini persona service.
//! Also loads configuration, resolves the data directory and turns image
//! files into data URIs.

pub mod attachment;
pub mod config;
pub mod filesystem;
pub mod gemini;
pub mod sqlite;
pub mod store;
