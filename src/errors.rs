use thiserror::Error;

/// Error type that captures credential store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The supplied credential does not unlock the store.
    #[error("Invalid credentials")]
    Auth,
    #[error("Crypto error: {0}")]
    Crypto(String),
    #[error("Unsupported store format: {0}")]
    Format(String),
    #[error("Corrupt store: {0}")]
    Corrupt(String),
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
    /// The tree operation would break the group hierarchy.
    #[error("Operation refused: {0}")]
    Refused(String),
}

impl StoreError {
    pub fn is_auth(&self) -> bool {
        matches!(self, StoreError::Auth)
    }
}
