//! Tag normalization.

use std::collections::BTreeSet;

use crate::changes::TagEdit;

/// Split comma separated values, trim and lower-case them
pub fn normalize(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Apply a tag edit to a tag set, returning one summary line per change
pub fn apply(tags: &mut BTreeSet<String>, edit: &TagEdit) -> Vec<String> {
    let mut summary = Vec::new();

    for tag in normalize(&edit.add) {
        if tags.insert(tag.clone()) {
            summary.push(format!("added tag {:?}", tag));
        }
    }
    for tag in normalize(&edit.remove) {
        if tags.remove(&tag) {
            summary.push(format!("removed tag {:?}", tag));
        }
    }

    summary
}
