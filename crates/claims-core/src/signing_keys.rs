//! Signing key manager.

use std::collections::BTreeSet;

use claims_crypto::{parse_public_key, KeyCategory, KeyPair};

use crate::changes::{SigningKeyEdit, SigningKeyInput};
use crate::errors::{EditError, Result};
use crate::traits::KeyVault;

/// Outcome of a signing key edit
#[derive(Debug, Default)]
pub struct SigningKeyOutcome {
    pub summary: Vec<String>,
    /// Key pairs generated for `generate` inputs, not yet stored
    pub generated: Vec<KeyPair>,
}

/// Add and remove signing keys of `category`
///
/// Supplied keys are validated before any key is generated. Removal of an
/// absent key is not an error. Claims already signed by a removed key keep
/// their recorded issuer.
pub fn apply<K: KeyVault + ?Sized>(
    keys: &mut BTreeSet<String>,
    edit: &SigningKeyEdit,
    category: KeyCategory,
    vault: &K,
) -> Result<SigningKeyOutcome> {
    for input in &edit.add {
        if let SigningKeyInput::Key(key) = input {
            parse_public_key(key, category).map_err(EditError::InvalidSigningKey)?;
        }
    }

    let mut outcome = SigningKeyOutcome::default();
    for input in &edit.add {
        let key = match input {
            SigningKeyInput::Key(key) => key.clone(),
            SigningKeyInput::Generate => {
                let keypair = vault.generate(category)?;
                let key = keypair.public_key().to_string();
                outcome.generated.push(keypair);
                key
            }
        };
        if keys.insert(key.clone()) {
            outcome.summary.push(format!("added signing key {}", key));
        }
    }

    for key in &edit.remove {
        if keys.remove(key) {
            outcome.summary.push(format!("removed signing key {}", key));
        }
    }

    Ok(outcome)
}
