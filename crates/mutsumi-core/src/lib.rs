//! Business logic and port traits for the Mutsumi persona chat.
//!
//! Defines the storage and persona-service ports the infra crate implements,
//! and the session repository, chat dispatch and conversation view that run
//! on top of them. Depends only on `mutsumi-types`, never on `mutsumi-infra`.

pub mod avatar;
pub mod credential;
pub mod dispatch;
pub mod garden;
pub mod persona;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;
