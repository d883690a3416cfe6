//! Requested field-level changes.
//!
//! Change sets arrive already parsed from the front end. Every field is
//! optional; an absent field leaves the claim untouched.

use std::convert::Infallible;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{EditError, ExclusiveJsOption, Result};
use crate::types::JetStreamLimits;

/// Label of a JetStream tier, `R{n}`
pub fn tier_label(tier: u8) -> String {
    format!("R{}", tier)
}

fn count<T>(option: &Option<T>) -> usize {
    usize::from(option.is_some())
}

fn count_list<T>(list: &[T]) -> usize {
    usize::from(!list.is_empty())
}

/// Tag additions and removals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEdit {
    /// Comma separated values to add
    pub add: Vec<String>,
    /// Comma separated values to remove
    pub remove: Vec<String>,
}

impl TagEdit {
    pub fn option_count(&self) -> usize {
        count_list(&self.add) + count_list(&self.remove)
    }
}

/// Publish/subscribe permission edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionEdit {
    pub allow_pub: Vec<String>,
    pub allow_sub: Vec<String>,
    pub allow_pubsub: Vec<String>,
    pub deny_pub: Vec<String>,
    pub deny_sub: Vec<String>,
    pub deny_pubsub: Vec<String>,
    /// Subjects removed from every list
    pub remove: Vec<String>,
    pub max_responses: Option<i64>,
    pub response_ttl: Option<Duration>,
    pub clear_response: bool,
}

impl PermissionEdit {
    pub fn option_count(&self) -> usize {
        count_list(&self.allow_pub)
            + count_list(&self.allow_sub)
            + count_list(&self.allow_pubsub)
            + count_list(&self.deny_pub)
            + count_list(&self.deny_sub)
            + count_list(&self.deny_pubsub)
            + count_list(&self.remove)
            + count(&self.max_responses)
            + count(&self.response_ttl)
            + usize::from(self.clear_response)
    }
}

/// Field updates for one JetStream limit record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JetStreamPatch {
    pub streams: Option<i64>,
    pub consumer: Option<i64>,
    pub disk_storage: Option<i64>,
    pub mem_storage: Option<i64>,
    pub max_disk_stream: Option<i64>,
    pub max_mem_stream: Option<i64>,
    pub max_ack_pending: Option<i64>,
    pub max_bytes_required: Option<bool>,
}

impl JetStreamPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write the supplied fields into `limits`
    pub fn apply(&self, limits: &mut JetStreamLimits) {
        if let Some(v) = self.streams {
            limits.streams = v;
        }
        if let Some(v) = self.consumer {
            limits.consumer = v;
        }
        if let Some(v) = self.disk_storage {
            limits.disk_storage = v;
        }
        if let Some(v) = self.mem_storage {
            limits.mem_storage = v;
        }
        if let Some(v) = self.max_disk_stream {
            limits.disk_max_stream_bytes = v;
        }
        if let Some(v) = self.max_mem_stream {
            limits.mem_max_stream_bytes = v;
        }
        if let Some(v) = self.max_ack_pending {
            limits.max_ack_pending = v;
        }
        if let Some(v) = self.max_bytes_required {
            limits.max_bytes_required = v;
        }
    }
}

/// JetStream edit decided from the supplied flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JetStreamRequest {
    /// No JetStream option supplied
    Unchanged,
    /// Edit of the global record
    Global(JetStreamPatch),
    /// Edit of one replication tier
    Tiered { tier: u8, patch: JetStreamPatch },
    /// Clear one tier, `0` for the global record
    RemoveTier(u8),
    /// Clear all JetStream limits
    Disable,
}

/// JetStream options as supplied on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JetStreamEdit {
    /// Tier addressed by the other options, `0` for global
    pub tier: Option<u8>,
    pub remove_tier: Option<u8>,
    pub disable: bool,
    pub patch: JetStreamPatch,
}

impl JetStreamEdit {
    /// Names of the flags that were supplied
    pub fn jetstream_flags(&self) -> Vec<String> {
        let p = &self.patch;
        [
            ("--js-tier", self.tier.is_some()),
            ("--rm-js-tier", self.remove_tier.is_some()),
            ("--js-disable", self.disable),
            ("--js-streams", p.streams.is_some()),
            ("--js-consumer", p.consumer.is_some()),
            ("--js-disk-storage", p.disk_storage.is_some()),
            ("--js-mem-storage", p.mem_storage.is_some()),
            ("--js-max-disk-stream", p.max_disk_stream.is_some()),
            ("--js-max-mem-stream", p.max_mem_stream.is_some()),
            ("--js-max-ack-pending", p.max_ack_pending.is_some()),
            ("--js-max-bytes-required", p.max_bytes_required.is_some()),
        ]
        .into_iter()
        .filter(|(_, set)| *set)
        .map(|(flag, _)| flag.to_string())
        .collect()
    }

    pub fn option_count(&self) -> usize {
        self.jetstream_flags().len()
    }

    /// Decide what the flags ask for
    ///
    /// `--js-disable` is checked before `--rm-js-tier`, so supplying both
    /// reports the disable conflict.
    pub fn request(&self) -> Result<JetStreamRequest> {
        let supplied = self.option_count();

        if self.disable {
            if supplied > 1 {
                return Err(EditError::ConflictingJsOptions(ExclusiveJsOption::Disable));
            }
            return Ok(JetStreamRequest::Disable);
        }

        if let Some(tier) = self.remove_tier {
            if supplied > 1 {
                return Err(EditError::ConflictingJsOptions(
                    ExclusiveJsOption::RemoveTier,
                ));
            }
            return Ok(JetStreamRequest::RemoveTier(tier));
        }

        Ok(match self.tier {
            None if self.patch.is_empty() => JetStreamRequest::Unchanged,
            None | Some(0) => JetStreamRequest::Global(self.patch),
            Some(tier) => JetStreamRequest::Tiered {
                tier,
                patch: self.patch,
            },
        })
    }
}

/// Account limit edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LimitsEdit {
    pub conn: Option<i64>,
    pub leaf_node_conn: Option<i64>,
    pub data: Option<i64>,
    pub exports: Option<i64>,
    pub imports: Option<i64>,
    pub payload: Option<i64>,
    pub subs: Option<i64>,
    pub wildcard_exports: Option<bool>,
    pub jetstream: JetStreamEdit,
}

impl LimitsEdit {
    pub fn option_count(&self) -> usize {
        count(&self.conn)
            + count(&self.leaf_node_conn)
            + count(&self.data)
            + count(&self.exports)
            + count(&self.imports)
            + count(&self.payload)
            + count(&self.subs)
            + count(&self.wildcard_exports)
            + self.jetstream.option_count()
    }
}

/// User limit edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserLimitsEdit {
    pub subs: Option<i64>,
    pub data: Option<i64>,
    pub payload: Option<i64>,
    pub add_connection_types: Vec<String>,
    pub remove_connection_types: Vec<String>,
}

impl UserLimitsEdit {
    pub fn option_count(&self) -> usize {
        count(&self.subs)
            + count(&self.data)
            + count(&self.payload)
            + count_list(&self.add_connection_types)
            + count_list(&self.remove_connection_types)
    }
}

/// A signing key to add, or a request to generate one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningKeyInput {
    Generate,
    Key(String),
}

impl FromStr for SigningKeyInput {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("generate") {
            SigningKeyInput::Generate
        } else {
            SigningKeyInput::Key(s.to_string())
        })
    }
}

/// Signing key additions and removals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningKeyEdit {
    pub add: Vec<SigningKeyInput>,
    pub remove: Vec<String>,
}

impl SigningKeyEdit {
    pub fn option_count(&self) -> usize {
        count_list(&self.add) + count_list(&self.remove)
    }
}

/// Validity window as unparsed time expressions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityEdit {
    pub start: Option<String>,
    pub expiry: Option<String>,
}

impl ValidityEdit {
    pub fn option_count(&self) -> usize {
        count(&self.start) + count(&self.expiry)
    }
}

/// Changes to an operator claim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorChanges {
    pub tags: TagEdit,
    pub validity: ValidityEdit,
    pub signing_keys: SigningKeyEdit,
    /// Account name or public key
    pub system_account: Option<String>,
    pub add_service_urls: Vec<String>,
    pub remove_service_urls: Vec<String>,
    pub account_server_url: Option<String>,
    pub require_signing_keys: Option<bool>,
}

impl OperatorChanges {
    pub fn option_count(&self) -> usize {
        self.tags.option_count()
            + self.validity.option_count()
            + self.signing_keys.option_count()
            + count(&self.system_account)
            + count_list(&self.add_service_urls)
            + count_list(&self.remove_service_urls)
            + count(&self.account_server_url)
            + count(&self.require_signing_keys)
    }
}

/// Changes to an account claim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub tags: TagEdit,
    pub info_url: Option<String>,
    pub description: Option<String>,
    pub validity: ValidityEdit,
    pub permissions: PermissionEdit,
    pub limits: LimitsEdit,
    pub signing_keys: SigningKeyEdit,
    pub disallow_bearer: Option<bool>,
}

impl AccountChanges {
    pub fn option_count(&self) -> usize {
        self.tags.option_count()
            + count(&self.info_url)
            + count(&self.description)
            + self.validity.option_count()
            + self.permissions.option_count()
            + self.limits.option_count()
            + self.signing_keys.option_count()
            + count(&self.disallow_bearer)
    }
}

/// Changes to a user claim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub tags: TagEdit,
    pub validity: ValidityEdit,
    pub permissions: PermissionEdit,
    pub limits: UserLimitsEdit,
    pub bearer: Option<bool>,
}

impl UserChanges {
    pub fn option_count(&self) -> usize {
        self.tags.option_count()
            + self.validity.option_count()
            + self.permissions.option_count()
            + self.limits.option_count()
            + count(&self.bearer)
    }
}
