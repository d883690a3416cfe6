//! Shared harness for end-to-end edit tests over real files and signatures.

#![allow(dead_code)]

use std::sync::Arc;

use claims_core::{
    AccountChanges, AccountClaims, ClaimEditService, ClaimEditor, ClaimStore, EditTarget,
    KeyVault, OperatorChanges, OperatorClaims, UserChanges, UserClaims,
};
use claims_crypto::{KeyCategory, KeyPair};
use claims_policy::ConstraintCheckerImpl;
use claims_storage::{FileKeyVault, FileStore, KeyringSigner};
use tempfile::TempDir;

pub type TimeFn = fn(&str) -> Result<i64, String>;

pub type Service =
    ClaimEditService<ConstraintCheckerImpl, FileStore, FileKeyVault, KeyringSigner<FileKeyVault>, TimeFn>;

/// Whole seconds; `0` means no expiry
pub fn parse_seconds(expr: &str) -> Result<i64, String> {
    expr.trim()
        .parse()
        .map_err(|_| format!("not a timestamp: {}", expr))
}

pub struct Harness {
    pub dir: TempDir,
    pub service: Service,
    pub store: Arc<FileStore>,
    pub vault: Arc<FileKeyVault>,
}

impl Harness {
    /// Fresh store with a committed operator named `O`
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::open(dir.path().join("store")).unwrap());
        let vault = Arc::new(FileKeyVault::open(dir.path().join("keys")).unwrap());
        let service = ClaimEditService::new(
            Arc::new(ConstraintCheckerImpl::new()),
            store.clone(),
            vault.clone(),
            Arc::new(KeyringSigner::new(vault.clone())),
            Arc::new(parse_seconds as TimeFn),
        );
        let operator = service.create_operator("O").unwrap();
        service.commit_operator(&operator).unwrap();
        Self {
            dir,
            service,
            store,
            vault,
        }
    }

    pub fn operator(&self) -> OperatorClaims {
        self.store.load_operator().unwrap()
    }

    pub fn account(&self, name: &str) -> AccountClaims {
        self.store.load_account(name).unwrap()
    }

    pub fn user(&self, account: &str, name: &str) -> UserClaims {
        self.store.load_user(account, name).unwrap()
    }

    pub fn add_account(&self, name: &str) -> AccountClaims {
        let edited = self.service.add_account(name, None).unwrap();
        self.service.commit_account(&edited).unwrap();
        edited.claim
    }

    pub fn add_user(&self, account: &str, name: &str, changes: UserChanges) -> UserClaims {
        let edited = self
            .service
            .add_user(&EditTarget::user(account, name), changes, None)
            .unwrap();
        self.service.commit_user(account, &edited).unwrap();
        edited.claim
    }

    pub fn edit_operator(&self, changes: OperatorChanges) -> OperatorClaims {
        let edited = self.service.edit_operator(changes).unwrap();
        self.service.commit_operator(&edited).unwrap();
        edited.claim
    }

    pub fn edit_account(&self, name: &str, changes: AccountChanges) -> AccountClaims {
        let edited = self
            .service
            .edit_account(&EditTarget::account(name), changes)
            .unwrap();
        self.service.commit_account(&edited).unwrap();
        edited.claim
    }

    pub fn edit_user(&self, account: &str, name: &str, changes: UserChanges) -> UserClaims {
        let edited = self
            .service
            .edit_user(&EditTarget::user(account, name), changes)
            .unwrap();
        self.service.commit_user(account, &edited).unwrap();
        edited.claim
    }

    /// A key pair held by the vault
    pub fn stored_key(&self, category: KeyCategory) -> String {
        let keypair = KeyPair::generate(category).unwrap();
        self.vault.store(&keypair).unwrap();
        keypair.public_key().to_string()
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
