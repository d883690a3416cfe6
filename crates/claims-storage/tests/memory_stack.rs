//! The edit engine over the in-memory store and vault.

use std::sync::Arc;

use claims_core::{
    AccountChanges, AccountClaims, ClaimEditService, ClaimEditor, ClaimStore, EditError,
    EditTarget, KeyVault, StoreError, UserChanges,
};
use claims_policy::ConstraintCheckerImpl;
use claims_storage::{decode_claim, KeyringSigner, MemoryKeyVault, MemoryStore, TokenPayload};

type TimeFn = fn(&str) -> Result<i64, String>;

type MemoryService = ClaimEditService<
    ConstraintCheckerImpl,
    MemoryStore,
    MemoryKeyVault,
    KeyringSigner<MemoryKeyVault>,
    TimeFn,
>;

fn no_time(expr: &str) -> Result<i64, String> {
    Err(format!("unexpected time expression {}", expr))
}

fn stack() -> (MemoryService, Arc<MemoryStore>, Arc<MemoryKeyVault>) {
    let store = Arc::new(MemoryStore::new());
    let vault = Arc::new(MemoryKeyVault::new());
    let service = ClaimEditService::new(
        Arc::new(ConstraintCheckerImpl::new()),
        store.clone(),
        vault.clone(),
        Arc::new(KeyringSigner::new(vault.clone())),
        Arc::new(no_time as TimeFn),
    );
    let operator = service.create_operator("O").unwrap();
    service.commit_operator(&operator).unwrap();
    (service, store, vault)
}

#[test]
fn account_and_user_lifecycle() {
    let (service, store, vault) = stack();

    let added = service.add_account("A", None).unwrap();
    assert!(vault.get(&added.claim.subject).unwrap().is_none());
    service.commit_account(&added).unwrap();
    assert!(vault.get(&added.claim.subject).unwrap().is_some());
    assert_eq!(
        store.account_token("A").unwrap().as_deref(),
        Some(added.token.as_str())
    );

    let mut changes = AccountChanges::default();
    changes.limits.conn = Some(5);
    let edited = service
        .edit_account(&EditTarget::account("A"), changes)
        .unwrap();
    service.commit_account(&edited).unwrap();

    let token = store.account_token("A").unwrap().unwrap();
    assert_ne!(token, added.token);
    let payload: TokenPayload<AccountClaims> = decode_claim(&token).unwrap();
    assert_eq!(payload.data.limits.conn, 5);
    assert_eq!(payload.iss, store.load_operator().unwrap().subject);

    let user = service
        .add_user(&EditTarget::user("A", "U"), UserChanges::default(), None)
        .unwrap();
    service.commit_user("A", &user).unwrap();
    assert_eq!(store.load_user("A", "U").unwrap().issuer, added.claim.subject);

    service.delete_user(&EditTarget::user("A", "U")).unwrap();
    assert!(store.list_users("A").unwrap().is_empty());
    assert!(matches!(
        service.delete_user(&EditTarget::user("A", "U")),
        Err(EditError::Store(StoreError::NotFound { .. }))
    ));
}

#[test]
fn duplicate_account_rejected() {
    let (service, store, _vault) = stack();
    let added = service.add_account("A", None).unwrap();
    service.commit_account(&added).unwrap();

    assert!(matches!(
        service.add_account("A", None),
        Err(EditError::Store(StoreError::AlreadyExists { .. }))
    ));
    assert_eq!(store.list_accounts().unwrap(), vec!["A".to_string()]);
}
