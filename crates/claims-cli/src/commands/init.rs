/*!
 * Init command
 */

use anyhow::{Context as _, Result};
use colored::*;

use claims_core::{ClaimEditor, ClaimStore, StoreError};

use super::{print_summary, Context};

/// Create and store a self-signed operator
pub fn init(ctx: &Context, name: Option<String>) -> Result<()> {
    match ctx.store.load_operator() {
        Ok(existing) => anyhow::bail!(
            "operator {:?} already exists in {:?}",
            existing.name,
            ctx.config.home
        ),
        Err(StoreError::NoOperator) => {}
        Err(e) => return Err(e).context("reading operator"),
    }

    let name = name.unwrap_or_else(|| ctx.config.operator_name.clone());
    let edited = ctx.service.create_operator(&name)?;
    ctx.service.commit_operator(&edited)?;

    print_summary(&edited.summary);
    println!(
        "{} operator {:?} in {:?}",
        "Initialized".bold().green(),
        name,
        ctx.config.home
    );
    Ok(())
}
