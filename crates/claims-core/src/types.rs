//! Claim type definitions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::time::Duration;

use claims_crypto::{KeyCategory, KeyPair};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Limit value meaning "no limit"
pub const UNLIMITED: i64 = -1;

/// Connection types a user may be restricted to
pub const CONNECTION_TYPES: &[&str] = &[
    "STANDARD",
    "WEBSOCKET",
    "LEAFNODE",
    "LEAFNODE_WS",
    "MQTT",
    "MQTT_WS",
    "IN_PROCESS",
];

/// Common surface of the three claim kinds
pub trait Claim: Debug + Clone + Serialize + DeserializeOwned + Send + Sync {
    /// Category of the subject key
    fn kind(&self) -> KeyCategory;

    /// Human readable name
    fn name(&self) -> &str;

    /// Public key of the entity the claim describes
    fn subject(&self) -> &str;

    /// Key that signed the claim, empty until first signed
    fn issuer(&self) -> &str;

    /// Record the result of signing
    fn stamp(&mut self, issuer: &str, issued_at: i64, id: &str);
}

/// JetStream resource limits for one tier (or the global record)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JetStreamLimits {
    pub mem_storage: i64,
    pub disk_storage: i64,
    pub streams: i64,
    pub consumer: i64,
    pub mem_max_stream_bytes: i64,
    pub disk_max_stream_bytes: i64,
    pub max_ack_pending: i64,
    pub max_bytes_required: bool,
}

impl JetStreamLimits {
    /// True when no field carries a value
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }
}

/// Account limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorLimits {
    pub subs: i64,
    pub data: i64,
    pub payload: i64,
    pub imports: i64,
    pub exports: i64,
    pub wildcard_exports: bool,
    pub conn: i64,
    pub leaf_node_conn: i64,
    pub jetstream: JetStreamLimits,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub jetstream_tiered: BTreeMap<String, JetStreamLimits>,
}

impl Default for OperatorLimits {
    fn default() -> Self {
        Self {
            subs: UNLIMITED,
            data: UNLIMITED,
            payload: UNLIMITED,
            imports: UNLIMITED,
            exports: UNLIMITED,
            wildcard_exports: true,
            conn: UNLIMITED,
            leaf_node_conn: UNLIMITED,
            jetstream: JetStreamLimits::default(),
            jetstream_tiered: BTreeMap::new(),
        }
    }
}

impl OperatorLimits {
    /// Whether a global JetStream record is in effect
    pub fn has_global_jetstream(&self) -> bool {
        !self.jetstream.is_unset()
    }

    /// Labels of the tiers currently configured
    pub fn tier_labels(&self) -> Vec<String> {
        self.jetstream_tiered.keys().cloned().collect()
    }

    /// Drop tiers that no longer carry any value
    pub fn prune_jetstream(&mut self) {
        self.jetstream_tiered.retain(|_, limits| !limits.is_unset());
    }
}

/// User limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserLimits {
    pub subs: i64,
    pub data: i64,
    pub payload: i64,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub allowed_connection_types: BTreeSet<String>,
}

impl Default for UserLimits {
    fn default() -> Self {
        Self {
            subs: UNLIMITED,
            data: UNLIMITED,
            payload: UNLIMITED,
            allowed_connection_types: BTreeSet::new(),
        }
    }
}

/// Allow and deny subject sets for one direction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permission {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub allow: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub deny: BTreeSet<String>,
}

/// Permission to publish responses to received requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePermission {
    pub max_msgs: i64,
    #[serde(with = "humantime_serde")]
    pub expires: Duration,
}

/// Publish, subscribe and response permissions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub publish: Permission,
    pub subscribe: Permission,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponsePermission>,
}

/// Operator claim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorClaims {
    pub name: String,
    pub subject: String,
    pub issuer: String,
    pub issued_at: i64,
    pub id: String,
    pub not_before: i64,
    pub expires: i64,
    pub tags: BTreeSet<String>,
    pub signing_keys: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_account: Option<String>,
    pub service_urls: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_server_url: Option<String>,
    pub strict_signing_key_usage: bool,
}

impl OperatorClaims {
    pub fn new(name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            ..Default::default()
        }
    }

    /// Whether `key` may sign accounts for this operator
    pub fn is_trusted_signer(&self, key: &str) -> bool {
        key == self.subject || self.signing_keys.contains(key)
    }
}

/// Account claim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountClaims {
    pub name: String,
    pub subject: String,
    pub issuer: String,
    pub issued_at: i64,
    pub id: String,
    pub not_before: i64,
    pub expires: i64,
    pub tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub limits: OperatorLimits,
    pub default_permissions: Permissions,
    pub signing_keys: BTreeSet<String>,
    pub disallow_bearer: bool,
}

impl AccountClaims {
    pub fn new(name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            ..Default::default()
        }
    }

    /// Whether `key` may sign users for this account
    pub fn is_trusted_signer(&self, key: &str) -> bool {
        key == self.subject || self.signing_keys.contains(key)
    }
}

/// User claim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserClaims {
    pub name: String,
    pub subject: String,
    pub issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_account: Option<String>,
    pub issued_at: i64,
    pub id: String,
    pub not_before: i64,
    pub expires: i64,
    pub tags: BTreeSet<String>,
    pub permissions: Permissions,
    pub limits: UserLimits,
    pub bearer_token: bool,
}

impl UserClaims {
    pub fn new(name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            ..Default::default()
        }
    }
}

macro_rules! impl_claim {
    ($ty:ty, $kind:expr) => {
        impl Claim for $ty {
            fn kind(&self) -> KeyCategory {
                $kind
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn subject(&self) -> &str {
                &self.subject
            }

            fn issuer(&self) -> &str {
                &self.issuer
            }

            fn stamp(&mut self, issuer: &str, issued_at: i64, id: &str) {
                self.issuer = issuer.to_string();
                self.issued_at = issued_at;
                self.id = id.to_string();
            }
        }
    };
}

impl_claim!(OperatorClaims, KeyCategory::Operator);
impl_claim!(AccountClaims, KeyCategory::Account);
impl_claim!(UserClaims, KeyCategory::User);

/// Token produced by a [`crate::ClaimSigner`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedToken {
    pub token: String,
    /// Public key that actually signed
    pub issuer: String,
    pub issued_at: i64,
    pub id: String,
}

/// Result of a successful edit, ready to be committed
#[derive(Debug, Clone)]
pub struct Edited<C: Claim> {
    pub claim: C,
    pub token: String,
    /// One line per applied change
    pub summary: Vec<String>,
    /// Key pairs created by the edit, stored on commit
    pub generated_keys: Vec<KeyPair>,
}

/// Which entity an account or user edit addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditTarget {
    /// Account named explicitly by the caller
    pub account: Option<String>,
    /// Account selected by the caller's context
    pub default_account: Option<String>,
    /// User name, for user edits
    pub user: Option<String>,
}

impl EditTarget {
    pub fn account(name: impl Into<String>) -> Self {
        Self {
            account: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn user(account: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            user: Some(user.into()),
            ..Default::default()
        }
    }

    pub fn with_default_account(mut self, account: Option<String>) -> Self {
        self.default_account = account;
        self
    }
}

/// Duration serialization using humantime format.
mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_limits_are_unlimited() {
        let account = AccountClaims::new("A", "AKEY");
        assert_eq!(account.limits.conn, UNLIMITED);
        assert_eq!(account.limits.data, UNLIMITED);
        assert!(!account.limits.has_global_jetstream());
        assert!(account.limits.jetstream_tiered.is_empty());
    }

    #[test]
    fn test_prune_drops_empty_tiers() {
        let mut limits = OperatorLimits::default();
        limits
            .jetstream_tiered
            .insert("R1".to_string(), JetStreamLimits::default());
        limits.jetstream_tiered.insert(
            "R3".to_string(),
            JetStreamLimits {
                streams: 2,
                ..Default::default()
            },
        );

        limits.prune_jetstream();
        assert_eq!(limits.tier_labels(), vec!["R3".to_string()]);
    }

    #[test]
    fn test_response_ttl_serializes_as_text() {
        let perms = Permissions {
            response: Some(ResponsePermission {
                max_msgs: 1000,
                expires: Duration::from_millis(4),
            }),
            ..Default::default()
        };

        let json = serde_json::to_value(&perms).unwrap();
        assert_eq!(json["response"]["expires"], "4ms");

        let back: Permissions = serde_json::from_value(json).unwrap();
        assert_eq!(back, perms);
    }

    #[test]
    fn test_stamp_records_issuer() {
        let mut user = UserClaims::new("U", "UKEY");
        user.stamp("AKEY", 42, "jti");

        assert_eq!(Claim::issuer(&user), "AKEY");
        assert_eq!(user.issued_at, 42);
        assert_eq!(user.kind(), KeyCategory::User);
    }

    #[test]
    fn test_trusted_signer() {
        let mut account = AccountClaims::new("A", "AKEY");
        account.signing_keys.insert("ASK".to_string());

        assert!(account.is_trusted_signer("AKEY"));
        assert!(account.is_trusted_signer("ASK"));
        assert!(!account.is_trusted_signer("OTHER"));
    }
}
