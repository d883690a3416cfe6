//! Validity window editing.

use crate::changes::ValidityEdit;
use crate::errors::{EditError, Result};
use crate::traits::TimeParser;

fn parse<T: TimeParser + ?Sized>(parser: &T, expr: &str) -> Result<i64> {
    parser.parse(expr).map_err(|reason| EditError::InvalidTime {
        expr: expr.to_string(),
        reason,
    })
}

/// Apply start/expiry expressions to a validity window
///
/// Both expressions are parsed before either field changes. An expiry of
/// `0` means the claim does not expire.
pub fn apply<T: TimeParser + ?Sized>(
    not_before: &mut i64,
    expires: &mut i64,
    edit: &ValidityEdit,
    parser: &T,
) -> Result<Vec<String>> {
    let start = edit.start.as_deref().map(|e| parse(parser, e)).transpose()?;
    let expiry = edit.expiry.as_deref().map(|e| parse(parser, e)).transpose()?;

    let new_start = start.unwrap_or(*not_before);
    let new_expiry = expiry.unwrap_or(*expires);
    if new_expiry != 0 && new_start > new_expiry {
        return Err(EditError::InvalidValidity {
            start: new_start,
            expiry: new_expiry,
        });
    }

    let mut summary = Vec::new();
    if let Some(start) = start {
        *not_before = start;
        summary.push(format!("changed start to {}", start));
    }
    if let Some(expiry) = expiry {
        *expires = expiry;
        summary.push(format!("changed expiry to {}", expiry));
    }
    Ok(summary)
}
