/*!
 * Flag groups shared by the add and edit commands
 */

use std::time::Duration;

use clap::Args;

use claims_core::{
    JetStreamEdit, JetStreamPatch, LimitsEdit, PermissionEdit, SigningKeyEdit, SigningKeyInput,
    TagEdit, UserLimitsEdit, ValidityEdit,
};

use crate::parse;

#[derive(Args, Debug, Default)]
pub struct TagArgs {
    /// Add tags (comma separated, lower-cased)
    #[arg(long)]
    pub tag: Vec<String>,

    /// Remove tags
    #[arg(long)]
    pub rm_tag: Vec<String>,
}

impl From<TagArgs> for TagEdit {
    fn from(args: TagArgs) -> Self {
        TagEdit {
            add: args.tag,
            remove: args.rm_tag,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ValidityArgs {
    /// Valid from: 0, YYYY-MM-DD, RFC 3339 or a relative duration
    #[arg(long)]
    pub start: Option<String>,

    /// Valid until: 0 for no expiry, YYYY-MM-DD, RFC 3339 or a relative duration
    #[arg(long)]
    pub expiry: Option<String>,
}

impl From<ValidityArgs> for ValidityEdit {
    fn from(args: ValidityArgs) -> Self {
        ValidityEdit {
            start: args.start,
            expiry: args.expiry,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct PermissionArgs {
    /// Subjects the entity may publish to
    #[arg(long)]
    pub allow_pub: Vec<String>,

    /// Subjects the entity may subscribe to
    #[arg(long)]
    pub allow_sub: Vec<String>,

    /// Subjects the entity may publish and subscribe to
    #[arg(long)]
    pub allow_pubsub: Vec<String>,

    #[arg(long)]
    pub deny_pub: Vec<String>,

    #[arg(long)]
    pub deny_sub: Vec<String>,

    #[arg(long)]
    pub deny_pubsub: Vec<String>,

    /// Remove subjects from every allow and deny list
    #[arg(long)]
    pub rm: Vec<String>,

    /// Maximum number of responses to a received request
    #[arg(long)]
    pub max_responses: Option<i64>,

    /// How long a response permission stays valid, e.g. 1s or 5m
    #[arg(long, value_parser = parse::duration)]
    pub response_ttl: Option<Duration>,

    /// Remove the response permission
    #[arg(long)]
    pub rm_response_perms: bool,
}

impl From<PermissionArgs> for PermissionEdit {
    fn from(args: PermissionArgs) -> Self {
        PermissionEdit {
            allow_pub: args.allow_pub,
            allow_sub: args.allow_sub,
            allow_pubsub: args.allow_pubsub,
            deny_pub: args.deny_pub,
            deny_sub: args.deny_sub,
            deny_pubsub: args.deny_pubsub,
            remove: args.rm,
            max_responses: args.max_responses,
            response_ttl: args.response_ttl,
            clear_response: args.rm_response_perms,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct SigningKeyArgs {
    /// Add a signing key, or `generate` to create one
    #[arg(long)]
    pub sk: Vec<SigningKeyInput>,

    /// Remove a signing key
    #[arg(long)]
    pub rm_sk: Vec<String>,
}

impl From<SigningKeyArgs> for SigningKeyEdit {
    fn from(args: SigningKeyArgs) -> Self {
        SigningKeyEdit {
            add: args.sk,
            remove: args.rm_sk,
        }
    }
}

/// Account limits; sizes accept units such as `10mib` and `-1` for unlimited
#[derive(Args, Debug, Default)]
pub struct LimitArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub conns: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    pub leaf_conns: Option<i64>,

    #[arg(long, value_parser = parse::size, allow_hyphen_values = true)]
    pub data: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    pub exports: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    pub imports: Option<i64>,

    #[arg(long, value_parser = parse::size, allow_hyphen_values = true)]
    pub payload: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    pub subs: Option<i64>,

    #[arg(
        long,
        value_parser = parse::boolean,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub wildcard_exports: Option<bool>,

    #[command(flatten)]
    pub jetstream: JetStreamArgs,
}

impl From<LimitArgs> for LimitsEdit {
    fn from(args: LimitArgs) -> Self {
        LimitsEdit {
            conn: args.conns,
            leaf_node_conn: args.leaf_conns,
            data: args.data,
            exports: args.exports,
            imports: args.imports,
            payload: args.payload,
            subs: args.subs,
            wildcard_exports: args.wildcard_exports,
            jetstream: args.jetstream.into(),
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct JetStreamArgs {
    /// Replication tier the other js options address, 0 for global
    #[arg(long)]
    pub js_tier: Option<u8>,

    /// Remove a tier's limits, 0 for global
    #[arg(long)]
    pub rm_js_tier: Option<u8>,

    /// Remove all jetstream limits
    #[arg(long)]
    pub js_disable: bool,

    #[arg(long, allow_hyphen_values = true)]
    pub js_streams: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    pub js_consumer: Option<i64>,

    #[arg(long, value_parser = parse::size, allow_hyphen_values = true)]
    pub js_disk_storage: Option<i64>,

    #[arg(long, value_parser = parse::size, allow_hyphen_values = true)]
    pub js_mem_storage: Option<i64>,

    #[arg(long, value_parser = parse::size, allow_hyphen_values = true)]
    pub js_max_disk_stream: Option<i64>,

    #[arg(long, value_parser = parse::size, allow_hyphen_values = true)]
    pub js_max_mem_stream: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    pub js_max_ack_pending: Option<i64>,

    #[arg(
        long,
        value_parser = parse::boolean,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub js_max_bytes_required: Option<bool>,
}

impl From<JetStreamArgs> for JetStreamEdit {
    fn from(args: JetStreamArgs) -> Self {
        JetStreamEdit {
            tier: args.js_tier,
            remove_tier: args.rm_js_tier,
            disable: args.js_disable,
            patch: JetStreamPatch {
                streams: args.js_streams,
                consumer: args.js_consumer,
                disk_storage: args.js_disk_storage,
                mem_storage: args.js_mem_storage,
                max_disk_stream: args.js_max_disk_stream,
                max_mem_stream: args.js_max_mem_stream,
                max_ack_pending: args.js_max_ack_pending,
                max_bytes_required: args.js_max_bytes_required,
            },
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct UserLimitArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub subs: Option<i64>,

    #[arg(long, value_parser = parse::size, allow_hyphen_values = true)]
    pub data: Option<i64>,

    #[arg(long, value_parser = parse::size, allow_hyphen_values = true)]
    pub payload: Option<i64>,

    /// Allow a connection type (STANDARD, WEBSOCKET, LEAFNODE, MQTT, ...)
    #[arg(long)]
    pub conn_type: Vec<String>,

    #[arg(long)]
    pub rm_conn_type: Vec<String>,
}

impl From<UserLimitArgs> for UserLimitsEdit {
    fn from(args: UserLimitArgs) -> Self {
        UserLimitsEdit {
            subs: args.subs,
            data: args.data,
            payload: args.payload,
            add_connection_types: args.conn_type,
            remove_connection_types: args.rm_conn_type,
        }
    }
}
