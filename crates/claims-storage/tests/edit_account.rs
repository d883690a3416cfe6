//! Account edits against the file store and keyring signer.

mod common;

use std::time::Duration;

use claims_core::{
    AccountChanges, AccountClaims, ClaimEditor, ClaimStore, EditError, EditTarget,
    JetStreamEdit, KeyVault, OperatorChanges, SigningKeyEdit, SigningKeyInput, TagEdit,
    UserChanges,
};
use claims_crypto::KeyCategory;
use claims_storage::{decode_claim, TokenPayload};

use common::{strings, Harness};

fn tags(add: &[&str], remove: &[&str]) -> AccountChanges {
    AccountChanges {
        tags: TagEdit {
            add: strings(add),
            remove: strings(remove),
        },
        ..Default::default()
    }
}

#[test]
fn flat_limits() {
    let h = Harness::new();
    h.add_account("A");

    let mut changes = AccountChanges::default();
    changes.limits.conn = Some(5);
    changes.limits.data = Some(10 * 1024 * 1024);
    changes.limits.payload = Some(1024);
    changes.limits.subs = Some(30);
    let account = h.edit_account("A", changes);

    assert_eq!(account.limits.conn, 5);
    assert_eq!(account.limits.data, 10_485_760);
    assert_eq!(account.limits.payload, 1024);
    assert_eq!(account.limits.subs, 30);
    assert_eq!(h.account("A").limits, account.limits);
}

#[test]
fn global_edit_over_tier_names_the_tier() {
    let h = Harness::new();
    h.add_account("A");

    let mut tiered = AccountChanges::default();
    tiered.limits.jetstream.tier = Some(2);
    tiered.limits.jetstream.patch.streams = Some(5);
    tiered.limits.jetstream.patch.disk_storage = Some(10);
    let account = h.edit_account("A", tiered);
    assert_eq!(account.limits.jetstream_tiered["R2"].streams, 5);

    let mut global = AccountChanges::default();
    global.limits.jetstream.patch.disk_storage = Some(10);
    let err = h
        .service
        .edit_account(&EditTarget::account("A"), global)
        .unwrap_err();
    assert!(matches!(err, EditError::JsModeConflict(_)));
    assert!(err.to_string().contains("R2"));
}

#[test]
fn tier_over_global_rejected() {
    let h = Harness::new();
    h.add_account("A");

    let mut global = AccountChanges::default();
    global.limits.jetstream.patch.streams = Some(1);
    h.edit_account("A", global);

    let mut tiered = AccountChanges::default();
    tiered.limits.jetstream.tier = Some(3);
    tiered.limits.jetstream.patch.streams = Some(1);
    assert!(matches!(
        h.service.edit_account(&EditTarget::account("A"), tiered),
        Err(EditError::JsModeConflict(_))
    ));
    assert!(h.account("A").limits.jetstream_tiered.is_empty());
}

#[test]
fn remove_global_tier_zeroes_record() {
    let h = Harness::new();
    h.add_account("A");

    let mut changes = AccountChanges::default();
    changes.limits.jetstream.patch.streams = Some(5);
    changes.limits.jetstream.patch.consumer = Some(6);
    changes.limits.jetstream.patch.disk_storage = Some(7);
    h.edit_account("A", changes);

    let mut remove = AccountChanges::default();
    remove.limits.jetstream.remove_tier = Some(0);
    let account = h.edit_account("A", remove);

    let js = account.limits.jetstream;
    assert_eq!((js.streams, js.consumer, js.disk_storage), (0, 0, 0));
}

/// Every value-carrying JetStream option on its own, with the flag it reports
fn jetstream_options() -> Vec<(&'static str, JetStreamEdit)> {
    let options: [(&'static str, fn(&mut JetStreamEdit)); 9] = [
        ("--js-tier", |js| js.tier = Some(1)),
        ("--js-streams", |js| js.patch.streams = Some(1)),
        ("--js-consumer", |js| js.patch.consumer = Some(1)),
        ("--js-disk-storage", |js| js.patch.disk_storage = Some(1024)),
        ("--js-mem-storage", |js| js.patch.mem_storage = Some(1024)),
        ("--js-max-disk-stream", |js| js.patch.max_disk_stream = Some(512)),
        ("--js-max-mem-stream", |js| js.patch.max_mem_stream = Some(512)),
        ("--js-max-ack-pending", |js| js.patch.max_ack_pending = Some(10)),
        ("--js-max-bytes-required", |js| js.patch.max_bytes_required = Some(true)),
    ];
    options
        .into_iter()
        .map(|(flag, set)| {
            let mut js = JetStreamEdit::default();
            set(&mut js);
            (flag, js)
        })
        .collect()
}

fn with_jetstream(js: JetStreamEdit) -> AccountChanges {
    let mut changes = AccountChanges::default();
    changes.limits.jetstream = js;
    changes
}

#[test]
fn remove_tier_and_disable_are_exclusive() {
    let h = Harness::new();
    h.add_account("A");

    for (flag, js) in jetstream_options() {
        let mut remove = js.clone();
        remove.remove_tier = Some(1);
        let err = h
            .service
            .edit_account(&EditTarget::account("A"), with_jetstream(remove))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "rm-js-tier is exclusive of all other js options",
            "--rm-js-tier with {}",
            flag
        );

        let mut disable = js;
        disable.disable = true;
        let err = h
            .service
            .edit_account(&EditTarget::account("A"), with_jetstream(disable))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "js-disable is exclusive of all other js options",
            "--js-disable with {}",
            flag
        );
    }

    let both = JetStreamEdit {
        disable: true,
        remove_tier: Some(1),
        ..Default::default()
    };
    let err = h
        .service
        .edit_account(&EditTarget::account("A"), with_jetstream(both))
        .unwrap_err();
    assert_eq!(err.to_string(), "js-disable is exclusive of all other js options");
}

#[test]
fn disable_clears_every_tier() {
    let h = Harness::new();
    h.add_account("A");

    for tier in [1, 3] {
        let mut changes = AccountChanges::default();
        changes.limits.jetstream.tier = Some(tier);
        changes.limits.jetstream.patch.mem_storage = Some(1024);
        h.edit_account("A", changes);
    }
    assert_eq!(h.account("A").limits.tier_labels(), strings(&["R1", "R3"]));

    let mut disable = AccountChanges::default();
    disable.limits.jetstream.disable = true;
    let account = h.edit_account("A", disable);
    assert!(account.limits.jetstream_tiered.is_empty());
    assert!(!account.limits.has_global_jetstream());
}

#[test]
fn system_account_rejects_jetstream_flags() {
    let h = Harness::new();
    h.add_account("SYS");
    h.edit_operator(OperatorChanges {
        system_account: Some("SYS".to_string()),
        ..Default::default()
    });

    let mut cases = jetstream_options();
    cases.push((
        "--rm-js-tier",
        JetStreamEdit {
            remove_tier: Some(0),
            ..Default::default()
        },
    ));
    cases.push((
        "--js-disable",
        JetStreamEdit {
            disable: true,
            ..Default::default()
        },
    ));

    for (flag, js) in cases {
        let err = h
            .service
            .edit_account(&EditTarget::account("SYS"), with_jetstream(js))
            .unwrap_err();
        assert!(matches!(err, EditError::Policy(_)), "{}: {}", flag, err);
        assert_eq!(
            err.to_string(),
            format!("jetstream is not available on the system account \"SYS\": {}", flag)
        );
    }

    h.edit_account("SYS", tags(&["system"], &[]));
    assert!(h.account("SYS").tags.contains("system"));
}

#[test]
fn signing_keys_added_and_removed() {
    let h = Harness::new();
    h.add_account("A");
    let k1 = h.stored_key(KeyCategory::Account);
    let k2 = h.stored_key(KeyCategory::Account);

    let account = h.edit_account(
        "A",
        AccountChanges {
            signing_keys: SigningKeyEdit {
                add: vec![
                    SigningKeyInput::Key(k1.clone()),
                    SigningKeyInput::Key(k2.clone()),
                ],
                ..Default::default()
            },
            ..Default::default()
        },
    );
    assert!(account.signing_keys.contains(&k1) && account.signing_keys.contains(&k2));

    let account = h.edit_account(
        "A",
        AccountChanges {
            signing_keys: SigningKeyEdit {
                remove: vec![k1.clone()],
                ..Default::default()
            },
            ..Default::default()
        },
    );
    assert_eq!(account.signing_keys.iter().collect::<Vec<_>>(), vec![&k2]);
}

#[test]
fn generated_signing_key_is_stored_on_commit() {
    let h = Harness::new();
    h.add_account("A");

    let edited = h
        .service
        .edit_account(
            &EditTarget::account("A"),
            AccountChanges {
                signing_keys: SigningKeyEdit {
                    add: vec![SigningKeyInput::Generate],
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();
    let generated = edited.claim.signing_keys.iter().next().unwrap().clone();
    assert!(generated.starts_with('A'));
    assert!(h.vault.get(&generated).unwrap().is_none());

    h.service.commit_account(&edited).unwrap();
    assert!(h.vault.get(&generated).unwrap().is_some());

    let user = h
        .service
        .add_user(
            &EditTarget::user("A", "U"),
            UserChanges::default(),
            Some(&generated),
        )
        .unwrap();
    assert_eq!(user.claim.issuer, generated);
}

#[test]
fn account_signing_key_must_be_account_key() {
    let h = Harness::new();
    h.add_account("A");
    let operator_key = h.stored_key(KeyCategory::Operator);

    let result = h.service.edit_account(
        &EditTarget::account("A"),
        AccountChanges {
            signing_keys: SigningKeyEdit {
                add: vec![SigningKeyInput::Key(operator_key)],
                ..Default::default()
            },
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(EditError::InvalidSigningKey(_))));
    assert!(h.account("A").signing_keys.is_empty());
}

#[test]
fn tags_are_normalized() {
    let h = Harness::new();
    h.add_account("A");

    let account = h.edit_account("A", tags(&["A,B,C"], &[]));
    assert_eq!(account.tags.len(), 3);

    let account = h.edit_account("A", tags(&[], &["A,B"]));
    assert_eq!(account.tags.iter().collect::<Vec<_>>(), vec!["c"]);
}

#[test]
fn default_permissions() {
    let h = Harness::new();
    h.add_account("A");

    let mut changes = AccountChanges::default();
    changes.permissions.allow_pub = strings(&["a,b"]);
    changes.permissions.allow_sub = strings(&["c"]);
    changes.permissions.deny_pubsub = strings(&["d"]);
    changes.permissions.max_responses = Some(100);
    changes.permissions.response_ttl = Some(Duration::from_secs(2));
    let account = h.edit_account("A", changes);

    let perms = &account.default_permissions;
    assert!(perms.publish.allow.contains("a") && perms.publish.allow.contains("b"));
    assert!(perms.subscribe.allow.contains("c"));
    assert!(perms.publish.deny.contains("d") && perms.subscribe.deny.contains("d"));
    let response = perms.response.as_ref().unwrap();
    assert_eq!(response.max_msgs, 100);
    assert_eq!(response.expires, Duration::from_secs(2));

    let mut changes = AccountChanges::default();
    changes.permissions.remove = strings(&["a,d"]);
    changes.permissions.clear_response = true;
    let account = h.edit_account("A", changes);
    let perms = &account.default_permissions;
    assert_eq!(perms.publish.allow.iter().collect::<Vec<_>>(), vec!["b"]);
    assert!(perms.publish.deny.is_empty() && perms.subscribe.deny.is_empty());
    assert!(perms.response.is_none());
}

#[test]
fn validity_window() {
    let h = Harness::new();
    h.add_account("A");

    let mut changes = AccountChanges::default();
    changes.validity.start = Some("1000".to_string());
    changes.validity.expiry = Some("2000".to_string());
    let account = h.edit_account("A", changes);
    assert_eq!((account.not_before, account.expires), (1000, 2000));

    let mut changes = AccountChanges::default();
    changes.validity.start = Some("3000".to_string());
    assert!(matches!(
        h.service.edit_account(&EditTarget::account("A"), changes),
        Err(EditError::InvalidValidity { .. })
    ));

    let mut changes = AccountChanges::default();
    changes.validity.expiry = Some("soon".to_string());
    assert!(matches!(
        h.service.edit_account(&EditTarget::account("A"), changes),
        Err(EditError::InvalidTime { .. })
    ));
}

#[test]
fn issuer_survives_signing_key_removal() {
    let h = Harness::new();
    let sk = h.stored_key(KeyCategory::Operator);
    h.edit_operator(OperatorChanges {
        signing_keys: SigningKeyEdit {
            add: vec![SigningKeyInput::Key(sk.clone())],
            ..Default::default()
        },
        ..Default::default()
    });

    let added = h.service.add_account("A", Some(&sk)).unwrap();
    h.service.commit_account(&added).unwrap();
    assert_eq!(h.account("A").issuer, sk);

    h.edit_operator(OperatorChanges {
        signing_keys: SigningKeyEdit {
            remove: vec![sk.clone()],
            ..Default::default()
        },
        ..Default::default()
    });
    assert_eq!(h.account("A").issuer, sk);

    let account = h.edit_account("A", tags(&["x"], &[]));
    assert_eq!(account.issuer, sk);
}

#[test]
fn bearer_cascade_blocks_disallow() {
    let h = Harness::new();
    h.add_account("A");
    h.add_user(
        "A",
        "U",
        UserChanges {
            bearer: Some(true),
            ..Default::default()
        },
    );

    let disallow = AccountChanges {
        disallow_bearer: Some(true),
        ..Default::default()
    };
    let err = h
        .service
        .edit_account(&EditTarget::account("A"), disallow.clone())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "user \"U\" in account \"A\" uses bearer token (needs to be deleted/changed first)"
    );
    assert!(!h.account("A").disallow_bearer);

    h.edit_user(
        "A",
        "U",
        UserChanges {
            bearer: Some(false),
            ..Default::default()
        },
    );
    assert!(h.edit_account("A", disallow).disallow_bearer);
}

#[test]
fn committed_token_verifies() {
    let h = Harness::new();
    h.add_account("A");
    let account = h.edit_account("A", tags(&["prod"], &[]));

    let token = h
        .store
        .read_token(KeyCategory::Account, "A", "")
        .unwrap();
    let payload: TokenPayload<AccountClaims> = decode_claim(&token).unwrap();
    assert_eq!(payload.iss, h.operator().subject);
    assert_eq!(payload.sub, account.subject);
    assert_eq!(payload.jti, account.id);
    assert!(payload.data.tags.contains("prod"));
}

#[test]
fn no_option_and_missing_account() {
    let h = Harness::new();
    assert_eq!(
        h.service
            .edit_account(&EditTarget::default(), tags(&["x"], &[]))
            .unwrap_err()
            .to_string(),
        "an account is required"
    );

    h.add_account("A");
    assert_eq!(
        h.service
            .edit_account(&EditTarget::default(), AccountChanges::default())
            .unwrap_err()
            .to_string(),
        "specify an edit option"
    );
    assert_eq!(h.store.list_accounts().unwrap(), strings(&["A"]));
}
