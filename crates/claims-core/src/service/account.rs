//! Account creation and edits.

use claims_crypto::KeyCategory;
use claims_policy::{ConstraintChecker, ConstraintContext, EntityKind};
use tracing::{info, warn};

use crate::{
    changes::AccountChanges, errors::*, limits, permissions, signing_keys, tags, traits::*,
    types::*, validity,
};

use super::{validate_url, ClaimEditService};

impl<P, S, K, G, T> ClaimEditService<P, S, K, G, T>
where
    P: ConstraintChecker,
    S: ClaimStore,
    K: KeyVault,
    G: ClaimSigner,
    T: TimeParser,
{
    /// Create an account with a fresh identity key
    pub(crate) fn add_account_internal(
        &self,
        name: &str,
        signer: Option<&str>,
    ) -> Result<Edited<AccountClaims>> {
        validate_name(KeyCategory::Account, name)?;
        let operator = self.store.load_operator()?;
        if self.store.list_accounts()?.iter().any(|a| a == name) {
            return Err(StoreError::AlreadyExists {
                kind: KeyCategory::Account,
                name: name.to_string(),
            }
            .into());
        }

        let issuer = match signer {
            Some(key) => key.to_string(),
            None if operator.strict_signing_key_usage => operator
                .signing_keys
                .iter()
                .next()
                .cloned()
                .ok_or(EditError::MissingSigningKeys)?,
            None => operator.subject.clone(),
        };
        if !operator.is_trusted_signer(&issuer)
            || (operator.strict_signing_key_usage && issuer == operator.subject)
        {
            return Err(EditError::UntrustedSigner {
                key: issuer,
                issuer: operator.name,
            });
        }

        let keypair = self.vault.generate(KeyCategory::Account)?;
        let mut claim = AccountClaims::new(name, keypair.public_key().to_string());
        let token = self.sign(&mut claim, &issuer)?;

        info!(account = %name, "Added account");
        Ok(Edited {
            summary: vec![format!("added account {:?}", name)],
            claim,
            token,
            generated_keys: vec![keypair],
        })
    }

    pub(crate) fn edit_account_internal(
        &self,
        target: &EditTarget,
        changes: AccountChanges,
    ) -> Result<Edited<AccountClaims>> {
        let name = self.require_account(target, EntityKind::Account)?;

        // Loaded
        let operator = self.store.load_operator()?;
        let current = self.store.load_account(&name)?;
        let is_system = operator.system_account.as_deref() == Some(current.subject.as_str());

        self.check(
            ConstraintContext::account(Some(name.clone()))
                .with_requested_options(changes.option_count())
                .with_jetstream(is_system, changes.limits.jetstream.jetstream_flags()),
        )?;

        let mut claim = current.clone();
        let mut summary = tags::apply(&mut claim.tags, &changes.tags);

        if let Some(url) = &changes.info_url {
            validate_url(url, &[])?;
            claim.info_url = Some(url.clone());
            summary.push(format!("changed info url to {:?}", url));
        }
        if let Some(description) = &changes.description {
            claim.description = Some(description.clone());
            summary.push(format!("changed description to {:?}", description));
        }
        summary.extend(validity::apply(
            &mut claim.not_before,
            &mut claim.expires,
            &changes.validity,
            self.time.as_ref(),
        )?);

        summary.extend(permissions::apply(
            &mut claim.default_permissions,
            &changes.permissions,
        ));
        summary.extend(limits::apply(&mut claim.limits, &changes.limits)?);

        let keys = signing_keys::apply(
            &mut claim.signing_keys,
            &changes.signing_keys,
            KeyCategory::Account,
            self.vault.as_ref(),
        )?;
        summary.extend(keys.summary);

        if let Some(disallow) = changes.disallow_bearer {
            claim.disallow_bearer = disallow;
            summary.push(format!("changed disallow bearer to {}", disallow));
        }

        // Validated
        if changes.disallow_bearer == Some(true) {
            let children = self.child_users(&name)?;
            if let Err(e) = self.check(
                ConstraintContext::account(Some(name.clone())).with_disallow_bearer(children),
            ) {
                warn!(account = %name, "Rejected account edit");
                return Err(e);
            }
        }

        // Signed
        let issuer = if current.issuer.is_empty() {
            operator.subject.clone()
        } else {
            current.issuer.clone()
        };
        let token = self.sign(&mut claim, &issuer)?;

        summary.push(format!("edited account {:?}", name));
        info!(account = %name, changes = summary.len(), "Edited account");

        Ok(Edited {
            claim,
            token,
            summary,
            generated_keys: keys.generated,
        })
    }
}
