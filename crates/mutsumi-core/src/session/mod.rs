//! Session repository: the ordered list of conversations and its persistence.

pub mod export;
pub mod repository;
