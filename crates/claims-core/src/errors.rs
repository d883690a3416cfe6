//! Claim edit error types.

use claims_crypto::KeyCategory;
use thiserror::Error;

/// Claim store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No claim stored under the name
    #[error("{kind} {name:?} does not exist")]
    NotFound { kind: KeyCategory, name: String },

    /// A claim already exists under the name
    #[error("{kind} {name:?} already exists")]
    AlreadyExists { kind: KeyCategory, name: String },

    /// The name cannot be stored as a file name
    #[error("{kind} name {name:?} is not allowed: must be non-empty without '/', '\\', '..' or NUL")]
    InvalidName { kind: KeyCategory, name: String },

    /// The store holds no operator yet
    #[error("operator is not initialized")]
    NoOperator,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Signer errors
#[derive(Debug, Error)]
pub enum SigningError {
    /// The vault holds no private key for the issuer
    #[error("unable to find the private key for {0}")]
    MissingKey(String),

    /// Token encoding or verification failed
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Cryptographic error
    #[error(transparent)]
    Crypto(#[from] claims_crypto::CryptoError),

    /// Key vault error
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which JetStream option is exclusive of the others
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusiveJsOption {
    RemoveTier,
    Disable,
}

impl std::fmt::Display for ExclusiveJsOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusiveJsOption::RemoveTier => write!(f, "rm-js-tier"),
            ExclusiveJsOption::Disable => write!(f, "js-disable"),
        }
    }
}

/// Global and tiered JetStream limits requested against the other mode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsModeConflict {
    /// Global edit while tiers exist
    #[error("cannot set a jetstream global limit when a configuration has tiered limits {}", quote_labels(.0))]
    GlobalOverTiers(Vec<String>),

    /// Tier edit while a global record exists
    #[error("cannot set a jetstream tier limit when a configuration has a global limit")]
    TierOverGlobal,
}

fn quote_labels(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| format!("'{}'", label))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Claim edit errors
#[derive(Debug, Error)]
pub enum EditError {
    /// Trust constraint violation
    #[error(transparent)]
    Policy(#[from] claims_policy::PolicyError),

    /// An exclusive JetStream option combined with others
    #[error("{0} is exclusive of all other js options")]
    ConflictingJsOptions(ExclusiveJsOption),

    /// JetStream global and tiered modes mixed
    #[error(transparent)]
    JsModeConflict(#[from] JsModeConflict),

    /// User edit without a resolvable user
    #[error("a user is required")]
    MissingUserContext,

    /// Signing key that is not a valid public key of the expected kind
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(#[source] claims_crypto::CryptoError),

    /// Named system account does not exist
    #[error("account {0:?} is not defined")]
    UnknownAccount(String),

    /// Key asked to sign is neither the issuer's identity nor one of its signing keys
    #[error("{key} is not a signing key of {issuer:?}")]
    UntrustedSigner { key: String, issuer: String },

    /// Operator requires signing keys but holds none
    #[error("operator requires signing keys but none are defined")]
    MissingSigningKeys,

    /// Time expression rejected by the parser
    #[error("invalid time {expr:?}: {reason}")]
    InvalidTime { expr: String, reason: String },

    /// Validity window with start after expiry
    #[error("start {start} is after expiry {expiry}")]
    InvalidValidity { start: i64, expiry: i64 },

    /// URL that does not parse or has the wrong scheme
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Unknown connection type
    #[error("unknown connection type {0:?}")]
    InvalidConnectionType(String),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Signing failure
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Cryptographic error
    #[error(transparent)]
    Crypto(#[from] claims_crypto::CryptoError),
}

/// Result type for claim edits
pub type Result<T> = std::result::Result<T, EditError>;

/// Result type for claim store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
