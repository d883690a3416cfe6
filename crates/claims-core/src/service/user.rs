//! User creation and edits.

use claims_crypto::KeyCategory;
use claims_policy::{BearerRequest, ConstraintChecker, ConstraintContext, EntityKind};
use tracing::info;

use crate::{
    changes::UserChanges, errors::*, limits, permissions, tags, traits::*, types::*, validity,
};

use super::ClaimEditService;

impl<P, S, K, G, T> ClaimEditService<P, S, K, G, T>
where
    P: ConstraintChecker,
    S: ClaimStore,
    K: KeyVault,
    G: ClaimSigner,
    T: TimeParser,
{
    pub(crate) fn add_user_internal(
        &self,
        target: &EditTarget,
        changes: UserChanges,
        signer: Option<&str>,
    ) -> Result<Edited<UserClaims>> {
        let account_name = self.require_account(target, EntityKind::User)?;
        let name = target.user.clone().ok_or(EditError::MissingUserContext)?;
        validate_name(KeyCategory::User, &name)?;
        let account = self.store.load_account(&account_name)?;
        if self
            .store
            .list_users(&account_name)?
            .iter()
            .any(|u| u.name == name)
        {
            return Err(StoreError::AlreadyExists {
                kind: KeyCategory::User,
                name,
            }
            .into());
        }

        self.check_bearer(&account, &name, changes.bearer, true)?;

        let keypair = self.vault.generate(KeyCategory::User)?;
        let mut claim = UserClaims::new(name.as_str(), keypair.public_key().to_string());
        let mut summary = vec![format!("added user {:?}", name)];
        summary.extend(self.apply_user_changes(&mut claim, &changes)?);

        let issuer = signer.unwrap_or(account.subject.as_str()).to_string();
        if !account.is_trusted_signer(&issuer) {
            return Err(EditError::UntrustedSigner {
                key: issuer,
                issuer: account.name,
            });
        }
        let token = self.sign_user(&mut claim, &account, &issuer)?;

        info!(account = %account_name, user = %name, "Added user");
        Ok(Edited {
            claim,
            token,
            summary,
            generated_keys: vec![keypair],
        })
    }

    pub(crate) fn edit_user_internal(
        &self,
        target: &EditTarget,
        changes: UserChanges,
    ) -> Result<Edited<UserClaims>> {
        let account_name = self.require_account(target, EntityKind::User)?;
        let name = self.resolve_user(&account_name, target)?;

        self.check(
            ConstraintContext::user(account_name.as_str())
                .with_requested_options(changes.option_count()),
        )?;

        // Loaded
        let account = self.store.load_account(&account_name)?;
        let current = self.store.load_user(&account_name, &name)?;
        self.check_bearer(&account, &name, changes.bearer, false)?;

        let mut claim = current.clone();
        let mut summary = self.apply_user_changes(&mut claim, &changes)?;

        // Signed
        let issuer = if current.issuer.is_empty() {
            account.subject.clone()
        } else {
            current.issuer.clone()
        };
        let token = self.sign_user(&mut claim, &account, &issuer)?;

        summary.push(format!("edited user {:?}", name));
        info!(account = %account_name, user = %name, changes = summary.len(), "Edited user");

        Ok(Edited {
            claim,
            token,
            summary,
            generated_keys: Vec::new(),
        })
    }

    /// Explicit user, else the only user of the account
    fn resolve_user(&self, account: &str, target: &EditTarget) -> Result<String> {
        if let Some(name) = &target.user {
            return Ok(name.clone());
        }
        match self.store.list_users(account)?.as_slice() {
            [only] => Ok(only.name.clone()),
            _ => Err(EditError::MissingUserContext),
        }
    }

    fn check_bearer(
        &self,
        account: &AccountClaims,
        user: &str,
        bearer: Option<bool>,
        creating: bool,
    ) -> Result<()> {
        if bearer != Some(true) {
            return Ok(());
        }
        self.check(ConstraintContext::user(account.name.as_str()).with_bearer_request(
            BearerRequest {
                user: user.to_string(),
                creating,
            },
            account.disallow_bearer,
        ))
    }

    fn apply_user_changes(&self, claim: &mut UserClaims, changes: &UserChanges) -> Result<Vec<String>> {
        let mut summary = tags::apply(&mut claim.tags, &changes.tags);
        summary.extend(validity::apply(
            &mut claim.not_before,
            &mut claim.expires,
            &changes.validity,
            self.time.as_ref(),
        )?);
        summary.extend(permissions::apply(
            &mut claim.permissions,
            &changes.permissions,
        ));
        summary.extend(limits::apply_user(&mut claim.limits, &changes.limits)?);
        if let Some(bearer) = changes.bearer {
            claim.bearer_token = bearer;
            summary.push(format!("changed bearer to {}", bearer));
        }
        Ok(summary)
    }

    /// Sign a user and record the account when a signing key issued it
    fn sign_user(
        &self,
        claim: &mut UserClaims,
        account: &AccountClaims,
        issuer: &str,
    ) -> Result<String> {
        let token = self.sign(claim, issuer)?;
        claim.issuer_account = (claim.issuer != account.subject).then(|| account.subject.clone());
        Ok(token)
    }
}
