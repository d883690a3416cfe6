/*!
 * Describe commands
 */

use anyhow::{Context as _, Result};
use clap::Subcommand;
use serde_json::Value;

use claims_core::ClaimStore;
use claims_crypto::KeyCategory;
use claims_storage::decode_claim;

use super::Context;

#[derive(Subcommand, Debug)]
pub enum DescribeCommand {
    /// Show the operator claim
    Operator {
        /// Print the decoded, verified token instead of the stored claim
        #[arg(long)]
        token: bool,
    },
    /// Show an account claim
    Account {
        #[arg(short = 'n', long)]
        name: Option<String>,

        #[arg(long)]
        token: bool,
    },
    /// Show a user claim
    User {
        #[arg(short = 'n', long)]
        name: String,

        #[arg(short = 'a', long)]
        account: Option<String>,

        #[arg(long)]
        token: bool,
    },
}

pub fn describe(ctx: &Context, command: DescribeCommand) -> Result<()> {
    let json = match command {
        DescribeCommand::Operator { token } => {
            if token {
                decoded(ctx, KeyCategory::Operator, "", "")?
            } else {
                serde_json::to_value(ctx.store.load_operator()?)?
            }
        }
        DescribeCommand::Account { name, token } => {
            let name = account_name(ctx, name)?;
            if token {
                decoded(ctx, KeyCategory::Account, &name, "")?
            } else {
                serde_json::to_value(ctx.store.load_account(&name)?)?
            }
        }
        DescribeCommand::User {
            name,
            account,
            token,
        } => {
            let account = account_name(ctx, account)?;
            if token {
                decoded(ctx, KeyCategory::User, &account, &name)?
            } else {
                serde_json::to_value(ctx.store.load_user(&account, &name)?)?
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Explicit name, else the configured default, else the only account
fn account_name(ctx: &Context, name: Option<String>) -> Result<String> {
    if let Some(name) = name.or_else(|| ctx.config.default_account.clone()) {
        return Ok(name);
    }
    match ctx.store.list_accounts()?.as_slice() {
        [only] => Ok(only.clone()),
        _ => anyhow::bail!("an account is required"),
    }
}

fn decoded(ctx: &Context, kind: KeyCategory, account: &str, user: &str) -> Result<Value> {
    let token = ctx.store.read_token(kind, account, user)?;
    let payload = decode_claim::<Value>(&token).context("verifying token")?;
    Ok(serde_json::to_value(payload)?)
}
