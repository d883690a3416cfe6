//! Limits editor.
//!
//! Flat limits are always writable. JetStream limits live either in the
//! global record or in per-replication tiers, never both; every edit is
//! checked against the current mode before anything is written.

use tracing::debug;

use crate::changes::{tier_label, JetStreamRequest, LimitsEdit, UserLimitsEdit};
use crate::errors::{EditError, JsModeConflict, Result};
use crate::types::{JetStreamLimits, OperatorLimits, UserLimits, CONNECTION_TYPES};

fn set_flat(summary: &mut Vec<String>, label: &str, target: &mut i64, value: Option<i64>) {
    if let Some(value) = value {
        *target = value;
        summary.push(format!("changed {} to {}", label, value));
    }
}

/// Check that `request` does not mix global and tiered modes
fn check_mode(limits: &OperatorLimits, request: &JetStreamRequest) -> Result<()> {
    match request {
        JetStreamRequest::Global(_) if !limits.jetstream_tiered.is_empty() => Err(
            JsModeConflict::GlobalOverTiers(limits.tier_labels()).into(),
        ),
        JetStreamRequest::Tiered { .. } if limits.has_global_jetstream() => {
            Err(JsModeConflict::TierOverGlobal.into())
        }
        _ => Ok(()),
    }
}

/// Apply an account limits edit, returning one summary line per change
///
/// Nothing is written when the JetStream part of the edit is rejected.
pub fn apply(limits: &mut OperatorLimits, edit: &LimitsEdit) -> Result<Vec<String>> {
    let request = edit.jetstream.request()?;
    check_mode(limits, &request)?;

    let mut summary = Vec::new();
    set_flat(&mut summary, "max connections", &mut limits.conn, edit.conn);
    set_flat(
        &mut summary,
        "max leaf node connections",
        &mut limits.leaf_node_conn,
        edit.leaf_node_conn,
    );
    set_flat(&mut summary, "max data", &mut limits.data, edit.data);
    set_flat(&mut summary, "max exports", &mut limits.exports, edit.exports);
    set_flat(&mut summary, "max imports", &mut limits.imports, edit.imports);
    set_flat(&mut summary, "max payload", &mut limits.payload, edit.payload);
    set_flat(&mut summary, "max subscriptions", &mut limits.subs, edit.subs);
    if let Some(wildcards) = edit.wildcard_exports {
        limits.wildcard_exports = wildcards;
        summary.push(format!("changed wildcard exports to {}", wildcards));
    }

    debug!(request = ?request, "Applying jetstream request");
    match request {
        JetStreamRequest::Unchanged => {}
        JetStreamRequest::Global(patch) => {
            patch.apply(&mut limits.jetstream);
            summary.push("changed jetstream global limits".to_string());
        }
        JetStreamRequest::Tiered { tier, patch } => {
            let label = tier_label(tier);
            patch.apply(limits.jetstream_tiered.entry(label.clone()).or_default());
            summary.push(format!("changed jetstream tier {} limits", label));
        }
        JetStreamRequest::RemoveTier(0) => {
            limits.jetstream = JetStreamLimits::default();
            summary.push("removed jetstream global limits".to_string());
        }
        JetStreamRequest::RemoveTier(tier) => {
            let label = tier_label(tier);
            if limits.jetstream_tiered.remove(&label).is_some() {
                summary.push(format!("removed jetstream tier {}", label));
            }
        }
        JetStreamRequest::Disable => {
            limits.jetstream = JetStreamLimits::default();
            limits.jetstream_tiered.clear();
            summary.push("disabled jetstream".to_string());
        }
    }

    limits.prune_jetstream();
    Ok(summary)
}

/// Upper-case and validate connection types
pub fn connection_types(values: &[String]) -> Result<Vec<String>> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(|value| value.trim().to_uppercase())
        .filter(|value| !value.is_empty())
        .map(|value| {
            if CONNECTION_TYPES.contains(&value.as_str()) {
                Ok(value)
            } else {
                Err(EditError::InvalidConnectionType(value))
            }
        })
        .collect()
}

/// Apply a user limits edit, returning one summary line per change
pub fn apply_user(limits: &mut UserLimits, edit: &UserLimitsEdit) -> Result<Vec<String>> {
    let added = connection_types(&edit.add_connection_types)?;
    let removed = connection_types(&edit.remove_connection_types)?;

    let mut summary = Vec::new();
    set_flat(&mut summary, "max subscriptions", &mut limits.subs, edit.subs);
    set_flat(&mut summary, "max data", &mut limits.data, edit.data);
    set_flat(&mut summary, "max payload", &mut limits.payload, edit.payload);

    for conn_type in added {
        if limits.allowed_connection_types.insert(conn_type.clone()) {
            summary.push(format!("added connection type {}", conn_type));
        }
    }
    for conn_type in removed {
        if limits.allowed_connection_types.remove(&conn_type) {
            summary.push(format!("removed connection type {}", conn_type));
        }
    }

    Ok(summary)
}
