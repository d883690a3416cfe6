//! Cryptographic error types.

use thiserror::Error;

use crate::keys::KeyCategory;

/// Cryptographic operation errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encoded key has the wrong length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected encoded length
        expected: usize,
        /// Actual encoded length
        actual: usize,
    },

    /// Encoded key starts with an unknown prefix
    #[error("invalid key prefix: {0:?}")]
    InvalidPrefix(char),

    /// Encoded key body is not valid hex
    #[error("invalid key encoding: {0}")]
    InvalidEncoding(String),

    /// Encoded key checksum does not match
    #[error("invalid key checksum")]
    InvalidChecksum,

    /// Public key belongs to another category
    #[error("{key} is not a valid {expected} public key")]
    WrongCategory {
        /// The offending key text
        key: String,
        /// The category the caller required
        expected: KeyCategory,
    },

    /// Random number generation failed
    #[error("random number generation failed: {0}")]
    RandomGenerationFailed(String),
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;
