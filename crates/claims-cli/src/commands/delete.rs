/*!
 * Delete commands
 */

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use claims_core::ClaimEditor;

use super::Context;

#[derive(Subcommand, Debug)]
pub enum DeleteCommand {
    /// Delete a user
    User {
        #[arg(short = 'n', long)]
        name: String,

        #[arg(short = 'a', long)]
        account: Option<String>,
    },
}

pub fn delete(ctx: &Context, command: DeleteCommand) -> Result<()> {
    match command {
        DeleteCommand::User { name, account } => {
            ctx.service
                .delete_user(&ctx.target(account, Some(name.clone())))?;
            println!("{} deleted user {:?}", "[ OK ]".green(), name);
        }
    }
    Ok(())
}
