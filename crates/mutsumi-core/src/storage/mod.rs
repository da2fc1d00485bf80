//! Key-value storage port and the best-effort adapter over it.
//!
//! Backends live in mutsumi-infra.

pub mod adapter;
pub mod box_store;
pub mod kv_store;
