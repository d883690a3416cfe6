//! Permission set editor.
//!
//! All operations are idempotent set mutations; none of them can fail.

use std::time::Duration;

use crate::changes::PermissionEdit;
use crate::types::{Permission, Permissions, ResponsePermission};

/// Direction(s) an allow or deny edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    Pub,
    Sub,
    Both,
}

impl PermissionKind {
    fn targets<'a>(&self, perms: &'a mut Permissions) -> Vec<&'a mut Permission> {
        match self {
            PermissionKind::Pub => vec![&mut perms.publish],
            PermissionKind::Sub => vec![&mut perms.subscribe],
            PermissionKind::Both => vec![&mut perms.publish, &mut perms.subscribe],
        }
    }
}

/// Split comma separated subjects
pub fn subjects(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|subject| !subject.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn add_allow(perms: &mut Permissions, kind: PermissionKind, subjects: &[String]) {
    for target in kind.targets(perms) {
        target.allow.extend(subjects.iter().cloned());
    }
}

pub fn add_deny(perms: &mut Permissions, kind: PermissionKind, subjects: &[String]) {
    for target in kind.targets(perms) {
        target.deny.extend(subjects.iter().cloned());
    }
}

/// Remove each subject from all four lists
pub fn remove(perms: &mut Permissions, subjects: &[String]) {
    for subject in subjects {
        perms.publish.allow.remove(subject);
        perms.publish.deny.remove(subject);
        perms.subscribe.allow.remove(subject);
        perms.subscribe.deny.remove(subject);
    }
}

/// Create the response permission if absent and update the supplied fields
pub fn set_response(perms: &mut Permissions, max_msgs: Option<i64>, ttl: Option<Duration>) {
    let response = perms.response.get_or_insert_with(ResponsePermission::default);
    if let Some(max_msgs) = max_msgs {
        response.max_msgs = max_msgs;
    }
    if let Some(ttl) = ttl {
        response.expires = ttl;
    }
}

pub fn clear_response(perms: &mut Permissions) {
    perms.response = None;
}

/// Apply a permission edit, returning one summary line per change
///
/// Additions run before removals, and clearing the response permission wins
/// over setting it.
pub fn apply(perms: &mut Permissions, edit: &PermissionEdit) -> Vec<String> {
    let mut summary = Vec::new();

    let allows = [
        (PermissionKind::Pub, &edit.allow_pub, "pub"),
        (PermissionKind::Sub, &edit.allow_sub, "sub"),
        (PermissionKind::Both, &edit.allow_pubsub, "pub and sub"),
    ];
    for (kind, values, label) in allows {
        let list = subjects(values);
        if !list.is_empty() {
            add_allow(perms, kind, &list);
            summary.push(format!("added {} allow {}", label, list.join(",")));
        }
    }

    let denies = [
        (PermissionKind::Pub, &edit.deny_pub, "pub"),
        (PermissionKind::Sub, &edit.deny_sub, "sub"),
        (PermissionKind::Both, &edit.deny_pubsub, "pub and sub"),
    ];
    for (kind, values, label) in denies {
        let list = subjects(values);
        if !list.is_empty() {
            add_deny(perms, kind, &list);
            summary.push(format!("added {} deny {}", label, list.join(",")));
        }
    }

    let removed = subjects(&edit.remove);
    if !removed.is_empty() {
        remove(perms, &removed);
        summary.push(format!("removed {}", removed.join(",")));
    }

    if edit.max_responses.is_some() || edit.response_ttl.is_some() {
        set_response(perms, edit.max_responses, edit.response_ttl);
        if let Some(max) = edit.max_responses {
            summary.push(format!("set max responses to {}", max));
        }
        if let Some(ttl) = edit.response_ttl {
            summary.push(format!(
                "set response ttl to {}",
                humantime::format_duration(ttl)
            ));
        }
    }

    if edit.clear_response {
        clear_response(perms);
        summary.push("removed response permissions".to_string());
    }

    summary
}
