//! Error types for the PCT service.

use pct_store::StoreError;
use thiserror::Error;

/// Errors that can occur during token operations.
///
/// Most public operations absorb these after logging; the fallible
/// `try_*` variants and degraded merge outcomes expose them.
#[derive(Debug, Error)]
pub enum PctError {
    /// A blank code was used where a token code is required.
    #[error("token code is blank")]
    InvalidCode,

    /// The directory store rejected or failed an operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Claims could not be serialized or parsed.
    #[error("claims serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record is missing attributes or holds unreadable values.
    #[error("corrupt token record {dn}: {reason}")]
    CorruptRecord { dn: String, reason: String },
}
