//! On-disk claim record.

use serde::{Deserialize, Serialize};

/// A claim together with its signed token
#[derive(Debug, Clone, Deserialize)]
pub struct StoredClaim<C> {
    pub claim: C,
    pub token: String,
}

/// Borrowed form used when writing
#[derive(Serialize)]
pub(crate) struct StoredClaimRef<'a, C: Serialize> {
    pub claim: &'a C,
    pub token: &'a str,
}
