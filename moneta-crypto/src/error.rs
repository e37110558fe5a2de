//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in key derivation and encryption.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Blob unreadable under the current key: wrong key, truncated or
    /// tampered ciphertext, or input that was never encrypted.
    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// The backing key cache rejected a write (e.g. storage full).
    /// Callers treat cache persistence as best-effort.
    #[error("key cache error: {0}")]
    Cache(String),
}
