//! Claim mutation orchestrator.
//!
//! Every edit runs `Loaded -> Validated -> Signed` against a private copy of
//! the stored claim and hands back an [`Edited`] value; `commit_*` moves it
//! to `Committed`. A rejected edit never reaches the signer or the store.

mod account;
mod operator;
mod user;

use std::sync::Arc;

use claims_crypto::KeyPair;
use claims_policy::{ChildUser, ConstraintChecker, ConstraintContext, EntityKind, PolicyError};
use tracing::{debug, info};

use crate::{changes::*, errors::*, traits::*, types::*};

/// Claim edit service implementation
pub struct ClaimEditService<P, S, K, G, T>
where
    P: ConstraintChecker,
    S: ClaimStore,
    K: KeyVault,
    G: ClaimSigner,
    T: TimeParser,
{
    checker: Arc<P>,
    store: Arc<S>,
    vault: Arc<K>,
    signer: Arc<G>,
    time: Arc<T>,
}

impl<P, S, K, G, T> ClaimEditService<P, S, K, G, T>
where
    P: ConstraintChecker,
    S: ClaimStore,
    K: KeyVault,
    G: ClaimSigner,
    T: TimeParser,
{
    /// Create a new claim edit service
    pub fn new(
        checker: Arc<P>,
        store: Arc<S>,
        vault: Arc<K>,
        signer: Arc<G>,
        time: Arc<T>,
    ) -> Self {
        Self {
            checker,
            store,
            vault,
            signer,
            time,
        }
    }

    /// Explicit account, else the context default, else the only account
    fn resolve_account(&self, target: &EditTarget) -> Result<Option<String>> {
        if let Some(name) = target.account.as_ref().or(target.default_account.as_ref()) {
            return Ok(Some(name.clone()));
        }
        let accounts = self.store.list_accounts()?;
        Ok(match accounts.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        })
    }

    /// Resolve the target account or fail before anything is loaded
    fn require_account(&self, target: &EditTarget, entity: EntityKind) -> Result<String> {
        let resolved = self.resolve_account(target)?;
        self.checker.check(ConstraintContext {
            entity,
            ..ConstraintContext::account(resolved.clone())
        })?;
        resolved.ok_or_else(|| PolicyError::MissingAccountContext.into())
    }

    fn check(&self, context: ConstraintContext) -> Result<()> {
        self.checker.check(context)?;
        Ok(())
    }

    /// Users of `account` as facts for the bearer cascade
    fn child_users(&self, account: &str) -> Result<Vec<ChildUser>> {
        Ok(self
            .store
            .list_users(account)?
            .into_iter()
            .map(|user| ChildUser {
                name: user.name,
                bearer: user.bearer_token,
            })
            .collect())
    }

    /// Sign `claim` with `issuer` and record what the signer reports
    fn sign<C: Claim>(&self, claim: &mut C, issuer: &str) -> Result<String> {
        let signed = self.signer.sign(claim, issuer)?;
        claim.stamp(&signed.issuer, signed.issued_at, &signed.id);
        debug!(
            kind = %claim.kind(),
            name = claim.name(),
            issuer = %signed.issuer,
            "Signed claim"
        );
        Ok(signed.token)
    }

    fn store_keys(&self, keys: &[KeyPair]) -> Result<()> {
        for keypair in keys {
            self.vault.store(keypair)?;
        }
        Ok(())
    }
}

/// Parse a URL and optionally restrict its scheme
fn validate_url(url: &str, schemes: &[&str]) -> Result<()> {
    let parsed = url::Url::parse(url).map_err(|e| EditError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !schemes.is_empty() && !schemes.contains(&parsed.scheme()) {
        return Err(EditError::InvalidUrl {
            url: url.to_string(),
            reason: format!("scheme must be one of {}", schemes.join(", ")),
        });
    }
    Ok(())
}

impl<P, S, K, G, T> ClaimEditor for ClaimEditService<P, S, K, G, T>
where
    P: ConstraintChecker,
    S: ClaimStore,
    K: KeyVault,
    G: ClaimSigner,
    T: TimeParser,
{
    fn create_operator(&self, name: &str) -> Result<Edited<OperatorClaims>> {
        self.create_operator_internal(name)
    }

    fn edit_operator(&self, changes: OperatorChanges) -> Result<Edited<OperatorClaims>> {
        self.edit_operator_internal(changes)
    }

    fn add_account(&self, name: &str, signer: Option<&str>) -> Result<Edited<AccountClaims>> {
        self.add_account_internal(name, signer)
    }

    fn edit_account(
        &self,
        target: &EditTarget,
        changes: AccountChanges,
    ) -> Result<Edited<AccountClaims>> {
        self.edit_account_internal(target, changes)
    }

    fn add_user(
        &self,
        target: &EditTarget,
        changes: UserChanges,
        signer: Option<&str>,
    ) -> Result<Edited<UserClaims>> {
        self.add_user_internal(target, changes, signer)
    }

    fn edit_user(&self, target: &EditTarget, changes: UserChanges) -> Result<Edited<UserClaims>> {
        self.edit_user_internal(target, changes)
    }

    fn commit_operator(&self, edited: &Edited<OperatorClaims>) -> Result<()> {
        self.store_keys(&edited.generated_keys)?;
        self.store.save_operator(&edited.claim, &edited.token)?;
        info!(operator = %edited.claim.name, "Committed operator");
        Ok(())
    }

    fn commit_account(&self, edited: &Edited<AccountClaims>) -> Result<()> {
        self.store_keys(&edited.generated_keys)?;
        self.store.save_account(&edited.claim, &edited.token)?;
        info!(account = %edited.claim.name, "Committed account");
        Ok(())
    }

    fn commit_user(&self, account: &str, edited: &Edited<UserClaims>) -> Result<()> {
        self.store_keys(&edited.generated_keys)?;
        self.store.save_user(account, &edited.claim, &edited.token)?;
        info!(account = %account, user = %edited.claim.name, "Committed user");
        Ok(())
    }

    fn delete_user(&self, target: &EditTarget) -> Result<()> {
        let account = self.require_account(target, EntityKind::User)?;
        let user = target.user.as_deref().ok_or(EditError::MissingUserContext)?;
        self.store.delete_user(&account, user)?;
        info!(account = %account, user = %user, "Deleted user");
        Ok(())
    }
}
