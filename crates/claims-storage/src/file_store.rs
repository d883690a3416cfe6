//! File-backed claim store.
//!
//! Layout under the root directory:
//!
//! ```text
//! operator.json
//! accounts/<account>/account.json
//! accounts/<account>/users/<user>.json
//! ```
//!
//! Each file holds the claim and its signed token as pretty JSON.

use std::fs;
use std::path::{Path, PathBuf};

use claims_core::{
    validate_name, AccountClaims, ClaimStore, OperatorClaims, StoreError, StoreResult,
    UserClaims,
};
use claims_crypto::KeyCategory;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::record::{StoredClaim, StoredClaimRef};

const OPERATOR_FILE: &str = "operator.json";
const ACCOUNTS_DIR: &str = "accounts";
const ACCOUNT_FILE: &str = "account.json";
const USERS_DIR: &str = "users";

/// Claim store rooted at a directory
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store at `root`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(root: P) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(ACCOUNTS_DIR))?;
        debug!("Opened file store at {:?}", root);
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn account_dir(&self, account: &str) -> StoreResult<PathBuf> {
        validate_name(KeyCategory::Account, account)?;
        Ok(self.root.join(ACCOUNTS_DIR).join(account))
    }

    fn account_file(&self, account: &str) -> StoreResult<PathBuf> {
        Ok(self.account_dir(account)?.join(ACCOUNT_FILE))
    }

    fn user_file(&self, account: &str, user: &str) -> StoreResult<PathBuf> {
        validate_name(KeyCategory::User, user)?;
        Ok(self
            .account_dir(account)?
            .join(USERS_DIR)
            .join(format!("{}.json", user)))
    }

    /// Token stored alongside a claim
    pub fn read_token(&self, kind: KeyCategory, account: &str, user: &str) -> StoreResult<String> {
        let path = match kind {
            KeyCategory::Operator => self.root.join(OPERATOR_FILE),
            KeyCategory::Account => self.account_file(account)?,
            KeyCategory::User => self.user_file(account, user)?,
        };
        let name = if kind == KeyCategory::User { user } else { account };
        read::<serde_json::Value>(&path, kind, name).map(|record| record.token)
    }
}

fn read<C: DeserializeOwned>(path: &Path, kind: KeyCategory, name: &str) -> StoreResult<StoredClaim<C>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(match kind {
                KeyCategory::Operator => StoreError::NoOperator,
                _ => StoreError::NotFound {
                    kind,
                    name: name.to_string(),
                },
            })
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Write through a sibling temp file so readers never see a partial claim
fn write<C: Serialize>(path: &Path, claim: &C, token: &str) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(&StoredClaimRef { claim, token })
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn list_dir(path: &Path, suffix: Option<&str>) -> StoreResult<Vec<String>> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let name = entry?.file_name().to_string_lossy().into_owned();
        match suffix {
            Some(suffix) => {
                if let Some(stem) = name.strip_suffix(suffix) {
                    names.push(stem.to_string());
                }
            }
            None => names.push(name),
        }
    }
    names.sort();
    Ok(names)
}

impl ClaimStore for FileStore {
    fn load_operator(&self) -> StoreResult<OperatorClaims> {
        read(&self.root.join(OPERATOR_FILE), KeyCategory::Operator, "").map(|r| r.claim)
    }

    fn load_account(&self, name: &str) -> StoreResult<AccountClaims> {
        read(&self.account_file(name)?, KeyCategory::Account, name).map(|r| r.claim)
    }

    fn load_user(&self, account: &str, name: &str) -> StoreResult<UserClaims> {
        read(&self.user_file(account, name)?, KeyCategory::User, name).map(|r| r.claim)
    }

    fn list_accounts(&self) -> StoreResult<Vec<String>> {
        let mut accounts = list_dir(&self.root.join(ACCOUNTS_DIR), None)?;
        accounts.retain(|name| {
            self.account_file(name)
                .map(|path| path.is_file())
                .unwrap_or(false)
        });
        Ok(accounts)
    }

    fn list_users(&self, account: &str) -> StoreResult<Vec<UserClaims>> {
        list_dir(&self.account_dir(account)?.join(USERS_DIR), Some(".json"))?
            .iter()
            .map(|name| self.load_user(account, name))
            .collect()
    }

    fn save_operator(&self, claim: &OperatorClaims, token: &str) -> StoreResult<()> {
        write(&self.root.join(OPERATOR_FILE), claim, token)
    }

    fn save_account(&self, claim: &AccountClaims, token: &str) -> StoreResult<()> {
        write(&self.account_file(&claim.name)?, claim, token)
    }

    fn save_user(&self, account: &str, claim: &UserClaims, token: &str) -> StoreResult<()> {
        if !self.account_file(account)?.is_file() {
            return Err(StoreError::NotFound {
                kind: KeyCategory::Account,
                name: account.to_string(),
            });
        }
        write(&self.user_file(account, &claim.name)?, claim, token)
    }

    fn delete_user(&self, account: &str, name: &str) -> StoreResult<()> {
        match fs::remove_file(self.user_file(account, name)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                kind: KeyCategory::User,
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_operator() {
        let (_dir, store) = store();
        assert!(matches!(store.load_operator(), Err(StoreError::NoOperator)));
    }

    #[test]
    fn test_account_round_trip() {
        let (_dir, store) = store();
        let mut account = AccountClaims::new("A", "AKEY");
        account.tags.insert("x".to_string());
        store.save_account(&account, "token").unwrap();

        assert_eq!(store.load_account("A").unwrap(), account);
        assert_eq!(store.list_accounts().unwrap(), vec!["A".to_string()]);
        assert_eq!(
            store.read_token(KeyCategory::Account, "A", "").unwrap(),
            "token"
        );
    }

    #[test]
    fn test_users_listed_per_account() {
        let (_dir, store) = store();
        store.save_account(&AccountClaims::new("A", "AKEY"), "t").unwrap();
        store.save_account(&AccountClaims::new("B", "BKEY"), "t").unwrap();
        assert!(store.list_users("A").unwrap().is_empty());

        store.save_user("A", &UserClaims::new("U", "UKEY"), "t").unwrap();
        store.save_user("A", &UserClaims::new("V", "VKEY"), "t").unwrap();

        let names: Vec<_> = store
            .list_users("A")
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["U".to_string(), "V".to_string()]);
        assert!(store.list_users("B").unwrap().is_empty());
    }

    #[test]
    fn test_user_needs_account() {
        let (_dir, store) = store();
        assert!(matches!(
            store.save_user("A", &UserClaims::new("U", "UKEY"), "t"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_path_like_names_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("store");
        let store = FileStore::open(&root).unwrap();

        for name in ["../../escaped", "a/b", "a\\b", "..", ".", "", "nul\0"] {
            assert!(
                matches!(
                    store.save_account(&AccountClaims::new(name, "AKEY"), "t"),
                    Err(StoreError::InvalidName { kind: KeyCategory::Account, .. })
                ),
                "account name {:?} accepted",
                name
            );
        }
        assert!(!dir.path().join("escaped").exists());

        store.save_account(&AccountClaims::new("A", "AKEY"), "t").unwrap();
        assert!(matches!(
            store.save_user("A", &UserClaims::new("../../../outside", "UKEY"), "t"),
            Err(StoreError::InvalidName { kind: KeyCategory::User, .. })
        ));
        assert!(!root.join("outside.json").exists());

        std::fs::write(root.join("victim.json"), "{}").unwrap();
        assert!(matches!(
            store.delete_user("A", "../../../victim"),
            Err(StoreError::InvalidName { .. })
        ));
        assert!(root.join("victim.json").exists());
        assert!(matches!(
            store.load_account("../A"),
            Err(StoreError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_delete_user() {
        let (_dir, store) = store();
        store.save_account(&AccountClaims::new("A", "AKEY"), "t").unwrap();
        store.save_user("A", &UserClaims::new("U", "UKEY"), "t").unwrap();

        store.delete_user("A", "U").unwrap();
        assert!(store.list_users("A").unwrap().is_empty());
        assert!(matches!(
            store.delete_user("A", "U"),
            Err(StoreError::NotFound { .. })
        ));
    }
}
