//! Error types for profile and storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for profile operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors raised by a [`Storage`](crate::Storage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded.
    #[error("cannot encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// The key cannot be used with this backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by a [`PlayerProfile`](crate::PlayerProfile).
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Persisting the profile failed.
    #[error("profile storage failed: {0}")]
    Storage(#[from] StorageError),

    /// The profile rejected the change.
    #[error("profile rejected change: {0}")]
    Rejected(String),
}
