//! Error types for the directory store.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during directory store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entry exists at the given DN.
    #[error("no entry at {dn}")]
    NotFound { dn: String },

    /// An entry already exists at the given DN.
    #[error("entry already exists at {dn}")]
    AlreadyExists { dn: String },

    /// The parent of the given DN does not exist.
    #[error("parent of {dn} does not exist")]
    NoSuchParent { dn: String },

    /// The store cannot serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A timestamp cannot be represented in the store's encoding.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Lock poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(dn: impl ToString) -> Self {
        Self::NotFound { dn: dn.to_string() }
    }

    pub fn already_exists(dn: impl ToString) -> Self {
        Self::AlreadyExists { dn: dn.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}
