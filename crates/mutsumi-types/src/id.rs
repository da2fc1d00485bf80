//! Opaque identifiers shared by sessions and messages.
//!
//! Ids are strings. New ones are UUID v7 (time-sortable); stored ones are
//! kept verbatim, whatever shape they were written in, including the
//! epoch-millisecond numbers and literals such as `"welcome"` found in
//! older session lists.

use serde::Deserialize;
use uuid::Uuid;

/// A fresh time-sortable id string.
pub(crate) fn fresh() -> String {
    Uuid::now_v7().to_string()
}

/// Wire form of a stored id: a string, or a bare number.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
        }
    }
}

/// Implements the string newtype surface for an id type.
macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// A fresh UUID v7 id; ids created later sort after earlier ones.
            pub fn new() -> Self {
                Self($crate::id::fresh())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$crate::id::RawId> for $name {
            fn from(raw: $crate::id::RawId) -> Self {
                Self(String::from(raw))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

pub(crate) use string_id;
