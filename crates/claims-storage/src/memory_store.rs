//! In-memory claim store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use claims_core::{
    AccountClaims, ClaimStore, OperatorClaims, StoreError, StoreResult, UserClaims,
};
use claims_crypto::KeyCategory;

use crate::record::StoredClaim;
use crate::vault::poisoned;

#[derive(Default)]
pub struct MemoryStore {
    operator: RwLock<Option<StoredClaim<OperatorClaims>>>,
    accounts: RwLock<BTreeMap<String, StoredClaim<AccountClaims>>>,
    users: RwLock<BTreeMap<String, BTreeMap<String, StoredClaim<UserClaims>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token last saved for an account
    pub fn account_token(&self, name: &str) -> StoreResult<Option<String>> {
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        Ok(accounts.get(name).map(|r| r.token.clone()))
    }
}

fn not_found(kind: KeyCategory, name: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        name: name.to_string(),
    }
}

fn record<C: Clone>(claim: &C, token: &str) -> StoredClaim<C> {
    StoredClaim {
        claim: claim.clone(),
        token: token.to_string(),
    }
}

impl ClaimStore for MemoryStore {
    fn load_operator(&self) -> StoreResult<OperatorClaims> {
        let operator = self.operator.read().map_err(|_| poisoned())?;
        operator
            .as_ref()
            .map(|r| r.claim.clone())
            .ok_or(StoreError::NoOperator)
    }

    fn load_account(&self, name: &str) -> StoreResult<AccountClaims> {
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        accounts
            .get(name)
            .map(|r| r.claim.clone())
            .ok_or_else(|| not_found(KeyCategory::Account, name))
    }

    fn load_user(&self, account: &str, name: &str) -> StoreResult<UserClaims> {
        let users = self.users.read().map_err(|_| poisoned())?;
        users
            .get(account)
            .and_then(|u| u.get(name))
            .map(|r| r.claim.clone())
            .ok_or_else(|| not_found(KeyCategory::User, name))
    }

    fn list_accounts(&self) -> StoreResult<Vec<String>> {
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        Ok(accounts.keys().cloned().collect())
    }

    fn list_users(&self, account: &str) -> StoreResult<Vec<UserClaims>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users
            .get(account)
            .map(|u| u.values().map(|r| r.claim.clone()).collect())
            .unwrap_or_default())
    }

    fn save_operator(&self, claim: &OperatorClaims, token: &str) -> StoreResult<()> {
        *self.operator.write().map_err(|_| poisoned())? = Some(record(claim, token));
        Ok(())
    }

    fn save_account(&self, claim: &AccountClaims, token: &str) -> StoreResult<()> {
        self.accounts
            .write()
            .map_err(|_| poisoned())?
            .insert(claim.name.clone(), record(claim, token));
        Ok(())
    }

    fn save_user(&self, account: &str, claim: &UserClaims, token: &str) -> StoreResult<()> {
        if !self
            .accounts
            .read()
            .map_err(|_| poisoned())?
            .contains_key(account)
        {
            return Err(not_found(KeyCategory::Account, account));
        }
        self.users
            .write()
            .map_err(|_| poisoned())?
            .entry(account.to_string())
            .or_default()
            .insert(claim.name.clone(), record(claim, token));
        Ok(())
    }

    fn delete_user(&self, account: &str, name: &str) -> StoreResult<()> {
        self.users
            .write()
            .map_err(|_| poisoned())?
            .get_mut(account)
            .and_then(|u| u.remove(name))
            .map(|_| ())
            .ok_or_else(|| not_found(KeyCategory::User, name))
    }
}
