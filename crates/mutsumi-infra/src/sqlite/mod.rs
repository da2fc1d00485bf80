//! SQLite persistence.

pub mod kv;
pub mod pool;
