//! Collaborator and engine trait definitions.
//!
//! The engine owns no state. Claims, keys, signing and time parsing are
//! supplied through these traits and injected into
//! [`crate::ClaimEditService`].

use claims_crypto::{KeyCategory, KeyPair};

use crate::changes::*;
use crate::errors::{SigningError, StoreError, StoreResult};
use crate::types::*;

/// Account and user names must be usable as a single path component
pub fn validate_name(kind: KeyCategory, name: &str) -> StoreResult<()> {
    if name.is_empty() || name == "." || name.contains("..") || name.contains(['/', '\\', '\0'])
    {
        return Err(StoreError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Persistent claim storage
pub trait ClaimStore: Send + Sync {
    fn load_operator(&self) -> StoreResult<OperatorClaims>;

    fn load_account(&self, name: &str) -> StoreResult<AccountClaims>;

    fn load_user(&self, account: &str, name: &str) -> StoreResult<UserClaims>;

    /// Account names, sorted
    fn list_accounts(&self) -> StoreResult<Vec<String>>;

    /// Every user issued under `account`; empty for a new account
    fn list_users(&self, account: &str) -> StoreResult<Vec<UserClaims>>;

    fn save_operator(&self, claim: &OperatorClaims, token: &str) -> StoreResult<()>;

    fn save_account(&self, claim: &AccountClaims, token: &str) -> StoreResult<()>;

    fn save_user(&self, account: &str, claim: &UserClaims, token: &str) -> StoreResult<()>;

    fn delete_user(&self, account: &str, name: &str) -> StoreResult<()>;
}

/// Key pair generation and private key storage
pub trait KeyVault: Send + Sync {
    /// Generate a new key pair; it is not stored until [`KeyVault::store`]
    fn generate(&self, category: KeyCategory) -> claims_crypto::Result<KeyPair> {
        KeyPair::generate(category)
    }

    fn store(&self, keypair: &KeyPair) -> StoreResult<()>;

    /// Key pair for a public key, if the vault holds its seed
    fn get(&self, public_key: &str) -> StoreResult<Option<KeyPair>>;
}

/// Produces signed tokens for claims
pub trait ClaimSigner: Send + Sync {
    /// Sign `claim` with the private key of `issuer`
    ///
    /// The returned [`SignedToken::issuer`] is recorded on the claim as is.
    fn sign<C: Claim>(&self, claim: &C, issuer: &str) -> Result<SignedToken, SigningError>;
}

/// Parses time expressions into Unix seconds
pub trait TimeParser: Send + Sync {
    fn parse(&self, expr: &str) -> Result<i64, String>;
}

impl<F> TimeParser for F
where
    F: Fn(&str) -> Result<i64, String> + Send + Sync,
{
    fn parse(&self, expr: &str) -> Result<i64, String> {
        self(expr)
    }
}

/// Claim editing engine
///
/// `create_*`, `add_*` and `edit_*` return an [`Edited`] claim that is signed
/// but not stored; nothing reaches the store until the matching `commit_*`.
pub trait ClaimEditor: Send + Sync {
    /// Create a self-signed operator
    fn create_operator(&self, name: &str) -> crate::Result<Edited<OperatorClaims>>;

    fn edit_operator(&self, changes: OperatorChanges) -> crate::Result<Edited<OperatorClaims>>;

    /// Create an account signed by the operator identity or `signer`
    fn add_account(&self, name: &str, signer: Option<&str>)
        -> crate::Result<Edited<AccountClaims>>;

    fn edit_account(
        &self,
        target: &EditTarget,
        changes: AccountChanges,
    ) -> crate::Result<Edited<AccountClaims>>;

    /// Create the user named by `target.user`
    fn add_user(
        &self,
        target: &EditTarget,
        changes: UserChanges,
        signer: Option<&str>,
    ) -> crate::Result<Edited<UserClaims>>;

    fn edit_user(
        &self,
        target: &EditTarget,
        changes: UserChanges,
    ) -> crate::Result<Edited<UserClaims>>;

    fn commit_operator(&self, edited: &Edited<OperatorClaims>) -> crate::Result<()>;

    fn commit_account(&self, edited: &Edited<AccountClaims>) -> crate::Result<()>;

    fn commit_user(&self, account: &str, edited: &Edited<UserClaims>) -> crate::Result<()>;

    fn delete_user(&self, target: &EditTarget) -> crate::Result<()>;
}
