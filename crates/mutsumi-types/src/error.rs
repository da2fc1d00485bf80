use thiserror::Error;

/// Errors from a key-value storage medium.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage medium unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded: need {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Whether this fault is a capacity failure (retrying with less data may help).
    pub fn is_quota(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

/// Errors configuring the persona service client.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("invalid API key: {0}")]
    InvalidCredential(String),

    #[error("failed to create persona client: {0}")]
    Client(String),
}

/// Input rejected before any network use.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("API key must start with 'AIza' and be 39 characters long")]
    MalformedCredential,

    #[error("message has neither text nor image")]
    EmptyMessage,

    #[error("not a base64 data URI")]
    MalformedDataUri,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_detection() {
        let err = StorageError::QuotaExceeded {
            needed: 10,
            quota: 5,
        };
        assert!(err.is_quota());
        assert!(!StorageError::Backend("x".into()).is_quota());
        assert_eq!(
            err.to_string(),
            "storage quota exceeded: need 10 bytes, quota is 5"
        );
    }
}
