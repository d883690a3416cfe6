/*!
 * Add commands
 */

use anyhow::{Context as _, Result};
use clap::Subcommand;
use colored::*;

use claims_core::{ClaimEditor, ClaimStore};

use super::edit::UserChangeArgs;
use super::{print_summary, Context};

#[derive(Subcommand, Debug)]
pub enum AddCommand {
    /// Add an account issued by the operator
    Account {
        /// Account name
        #[arg(short = 'n', long)]
        name: String,

        /// Operator signing key to issue the account with
        #[arg(short = 'K', long)]
        signer: Option<String>,
    },
    /// Add a user issued by an account
    User {
        /// User name
        #[arg(short = 'n', long)]
        name: String,

        /// Account of the user
        #[arg(short = 'a', long)]
        account: Option<String>,

        /// Account signing key to issue the user with
        #[arg(short = 'K', long)]
        signer: Option<String>,

        #[command(flatten)]
        changes: UserChangeArgs,
    },
}

pub fn add(ctx: &Context, command: AddCommand) -> Result<()> {
    match command {
        AddCommand::Account { name, signer } => {
            let edited = ctx.service.add_account(&name, signer.as_deref())?;
            ctx.service.commit_account(&edited)?;
            print_summary(&edited.summary);
            println!("  {} {}", "Account key:".bold(), edited.claim.subject);
        }
        AddCommand::User {
            name,
            account,
            signer,
            changes,
        } => {
            let target = ctx.target(account, Some(name));
            let edited = ctx
                .service
                .add_user(&target, changes.into(), signer.as_deref())?;

            // Same resolution order as the engine
            let account = match target.account.or(target.default_account) {
                Some(account) => account,
                None => only_account(ctx)?,
            };
            ctx.service.commit_user(&account, &edited)?;
            print_summary(&edited.summary);
            println!("  {} {}", "User key:".bold(), edited.claim.subject);
        }
    }
    Ok(())
}

fn only_account(ctx: &Context) -> Result<String> {
    let accounts = ctx.store.list_accounts().context("listing accounts")?;
    match accounts.as_slice() {
        [only] => Ok(only.clone()),
        _ => anyhow::bail!("an account is required"),
    }
}
