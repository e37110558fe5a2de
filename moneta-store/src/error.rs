//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the persistence layer.
///
/// Reads through the secure store never surface these for missing or
/// corrupt records; they matter on the write path, where silently dropping
/// user data would be unacceptable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(#[from] duckdb::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] moneta_crypto::CryptoError),
}
