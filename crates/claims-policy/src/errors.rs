//! Constraint violation types.

use thiserror::Error;

/// Constraint violations
///
/// Display strings are user facing and stable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The edit requested no change at all
    #[error("specify an edit option")]
    NoOptionSpecified,

    /// No target account could be resolved
    #[error("an account is required")]
    MissingAccountContext,

    /// JetStream options were requested on the operator's system account
    #[error("jetstream is not available on the system account {account:?}: {}", .flags.join(", "))]
    SystemAccountJetStream { account: String, flags: Vec<String> },

    /// Disallowing bearer tokens while a child user still uses one
    #[error("user {user:?} in account {account:?} uses bearer token (needs to be deleted/changed first)")]
    BearerConflict { account: String, user: String },

    /// Creating a bearer user under an account that disallows them
    #[error("account {account:?} forbids the use of bearer token")]
    BearerForbidden { account: String },

    /// Turning an existing user into a bearer user under a disallowing account
    #[error("account disallows bearer token")]
    BearerDisallowed { account: String },
}

/// Result type for constraint checks
pub type Result<T> = std::result::Result<T, PolicyError>;
