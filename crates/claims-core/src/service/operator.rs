//! Operator creation and edits.

use claims_crypto::{parse_public_key, KeyCategory};
use claims_policy::{ConstraintChecker, ConstraintContext};
use tracing::info;

use crate::{
    changes::OperatorChanges, errors::*, signing_keys, tags, traits::*, types::*, validity,
};

use super::{validate_url, ClaimEditService};

/// Schemes accepted for operator service URLs
const SERVICE_URL_SCHEMES: &[&str] = &["nats", "tls", "ws", "wss"];

impl<P, S, K, G, T> ClaimEditService<P, S, K, G, T>
where
    P: ConstraintChecker,
    S: ClaimStore,
    K: KeyVault,
    G: ClaimSigner,
    T: TimeParser,
{
    /// Create a self-signed operator
    ///
    /// The identity key is stored right away: the operator signs its own claim.
    pub(crate) fn create_operator_internal(&self, name: &str) -> Result<Edited<OperatorClaims>> {
        info!(operator = %name, "Creating operator");
        let keypair = self.vault.generate(KeyCategory::Operator)?;
        self.vault.store(&keypair)?;

        let mut claim = OperatorClaims::new(name, keypair.public_key().to_string());
        let issuer = claim.subject.clone();
        let token = self.sign(&mut claim, &issuer)?;

        Ok(Edited {
            summary: vec![format!("generated and stored operator key {:?}", claim.subject)],
            claim,
            token,
            generated_keys: Vec::new(),
        })
    }

    pub(crate) fn edit_operator_internal(
        &self,
        changes: OperatorChanges,
    ) -> Result<Edited<OperatorClaims>> {
        self.check(ConstraintContext::operator().with_requested_options(changes.option_count()))?;

        let current = self.store.load_operator()?;
        let mut claim = current.clone();
        let mut summary = tags::apply(&mut claim.tags, &changes.tags);

        summary.extend(validity::apply(
            &mut claim.not_before,
            &mut claim.expires,
            &changes.validity,
            self.time.as_ref(),
        )?);

        let keys = signing_keys::apply(
            &mut claim.signing_keys,
            &changes.signing_keys,
            KeyCategory::Operator,
            self.vault.as_ref(),
        )?;
        summary.extend(keys.summary);

        if let Some(system_account) = &changes.system_account {
            let (name, subject) = self.find_account(system_account)?;
            summary.push(format!("set system account {:?}", name));
            claim.system_account = Some(subject);
        }

        for url in &changes.add_service_urls {
            validate_url(url, SERVICE_URL_SCHEMES)?;
            if claim.service_urls.insert(url.clone()) {
                summary.push(format!("added service url {}", url));
            }
        }
        for url in &changes.remove_service_urls {
            if claim.service_urls.remove(url) {
                summary.push(format!("removed service url {}", url));
            }
        }

        if let Some(url) = &changes.account_server_url {
            validate_url(url, &[])?;
            claim.account_server_url = Some(url.clone());
            summary.push(format!("set account jwt server url to {:?}", url));
        }

        if let Some(strict) = changes.require_signing_keys {
            claim.strict_signing_key_usage = strict;
            summary.push(format!("changed signing key requirement to {}", strict));
        }
        if claim.strict_signing_key_usage && claim.signing_keys.is_empty() {
            return Err(EditError::MissingSigningKeys);
        }

        let issuer = if current.issuer.is_empty() {
            current.subject.clone()
        } else {
            current.issuer.clone()
        };
        let token = self.sign(&mut claim, &issuer)?;

        summary.push(format!("edited operator {:?}", claim.name));
        info!(operator = %claim.name, changes = summary.len(), "Edited operator");

        Ok(Edited {
            claim,
            token,
            summary,
            generated_keys: keys.generated,
        })
    }

    /// Find an account by name or by public key, returning `(name, subject)`
    fn find_account(&self, reference: &str) -> Result<(String, String)> {
        if parse_public_key(reference, KeyCategory::Account).is_ok() {
            for name in self.store.list_accounts()? {
                let account = self.store.load_account(&name)?;
                if account.subject == reference {
                    return Ok((account.name, account.subject));
                }
            }
            return Err(EditError::UnknownAccount(reference.to_string()));
        }

        match self.store.load_account(reference) {
            Ok(account) => Ok((account.name, account.subject)),
            Err(StoreError::NotFound { .. }) => {
                Err(EditError::UnknownAccount(reference.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
