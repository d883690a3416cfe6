/*!
 * Edit commands
 */

use anyhow::Result;
use clap::{Args, Subcommand};

use claims_core::{AccountChanges, ClaimEditor, ClaimStore, OperatorChanges, UserChanges};

use super::args::*;
use super::{print_summary, Context};
use crate::parse;

#[derive(Subcommand, Debug)]
pub enum EditCommand {
    /// Edit the operator
    Operator(OperatorArgs),
    /// Edit an account
    Account(AccountArgs),
    /// Edit a user
    User(UserArgs),
}

#[derive(Args, Debug)]
pub struct OperatorArgs {
    #[command(flatten)]
    pub tags: TagArgs,

    #[command(flatten)]
    pub validity: ValidityArgs,

    #[command(flatten)]
    pub signing_keys: SigningKeyArgs,

    /// System account, by name or public key
    #[arg(long)]
    pub system_account: Option<String>,

    /// Add a service url (nats, tls, ws or wss)
    #[arg(long = "service-url")]
    pub add_service_urls: Vec<String>,

    #[arg(long = "rm-service-url")]
    pub remove_service_urls: Vec<String>,

    /// Url of the account jwt server
    #[arg(long = "account-jwt-server-url")]
    pub account_server_url: Option<String>,

    /// Require accounts to be issued by operator signing keys
    #[arg(
        long,
        value_parser = parse::boolean,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub require_signing_keys: Option<bool>,
}

impl From<OperatorArgs> for OperatorChanges {
    fn from(args: OperatorArgs) -> Self {
        OperatorChanges {
            tags: args.tags.into(),
            validity: args.validity.into(),
            signing_keys: args.signing_keys.into(),
            system_account: args.system_account,
            add_service_urls: args.add_service_urls,
            remove_service_urls: args.remove_service_urls,
            account_server_url: args.account_server_url,
            require_signing_keys: args.require_signing_keys,
        }
    }
}

#[derive(Args, Debug)]
pub struct AccountArgs {
    /// Account to edit
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    #[command(flatten)]
    pub tags: TagArgs,

    /// Link to more information about the account
    #[arg(long)]
    pub info_url: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[command(flatten)]
    pub validity: ValidityArgs,

    #[command(flatten)]
    pub permissions: PermissionArgs,

    #[command(flatten)]
    pub limits: LimitArgs,

    #[command(flatten)]
    pub signing_keys: SigningKeyArgs,

    /// Forbid users of this account from using bearer tokens
    #[arg(
        long,
        value_parser = parse::boolean,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub disallow_bearer: Option<bool>,
}

impl AccountArgs {
    fn split(self) -> (Option<String>, AccountChanges) {
        let changes = AccountChanges {
            tags: self.tags.into(),
            info_url: self.info_url,
            description: self.description,
            validity: self.validity.into(),
            permissions: self.permissions.into(),
            limits: self.limits.into(),
            signing_keys: self.signing_keys.into(),
            disallow_bearer: self.disallow_bearer,
        };
        (self.name, changes)
    }
}

#[derive(Args, Debug)]
pub struct UserArgs {
    /// User to edit
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Account of the user
    #[arg(short = 'a', long)]
    pub account: Option<String>,

    #[command(flatten)]
    pub changes: UserChangeArgs,
}

/// Flags shared by `add user` and `edit user`
#[derive(Args, Debug, Default)]
pub struct UserChangeArgs {
    #[command(flatten)]
    pub tags: TagArgs,

    #[command(flatten)]
    pub validity: ValidityArgs,

    #[command(flatten)]
    pub permissions: PermissionArgs,

    #[command(flatten)]
    pub limits: UserLimitArgs,

    /// Connect without proving possession of the user key
    #[arg(
        long,
        value_parser = parse::boolean,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub bearer: Option<bool>,
}

impl From<UserChangeArgs> for UserChanges {
    fn from(args: UserChangeArgs) -> Self {
        UserChanges {
            tags: args.tags.into(),
            validity: args.validity.into(),
            permissions: args.permissions.into(),
            limits: args.limits.into(),
            bearer: args.bearer,
        }
    }
}

pub fn edit(ctx: &Context, command: EditCommand) -> Result<()> {
    match command {
        EditCommand::Operator(args) => {
            let edited = ctx.service.edit_operator(args.into())?;
            ctx.service.commit_operator(&edited)?;
            print_summary(&edited.summary);
        }
        EditCommand::Account(args) => {
            let (name, changes) = args.split();
            let edited = ctx.service.edit_account(&ctx.target(name, None), changes)?;
            ctx.service.commit_account(&edited)?;
            print_summary(&edited.summary);
        }
        EditCommand::User(args) => {
            let target = ctx.target(args.account, args.name);
            let edited = ctx.service.edit_user(&target, args.changes.into())?;
            let account = match target.account.or(target.default_account) {
                Some(account) => account,
                None => resolve_user_account(ctx, &edited.claim.subject)?,
            };
            ctx.service.commit_user(&account, &edited)?;
            print_summary(&edited.summary);
        }
    }
    Ok(())
}

/// Account owning a user, found by its subject
fn resolve_user_account(ctx: &Context, subject: &str) -> Result<String> {
    for account in ctx.store.list_accounts()? {
        if ctx
            .store
            .list_users(&account)?
            .iter()
            .any(|user| user.subject == subject)
        {
            return Ok(account);
        }
    }
    anyhow::bail!("no account holds user {}", subject)
}
