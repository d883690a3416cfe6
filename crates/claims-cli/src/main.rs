/*!
 * Claims CLI
 *
 * Edits the Operator → Account → User claim hierarchy kept in a local store:
 * 1. Initialize a self-signed operator
 * 2. Add accounts and users issued by it
 * 3. Edit tags, permissions, limits, signing keys and validity
 * 4. Describe stored claims and their verified tokens
 *
 * Usage:
 *   claims init --name O
 *   claims add account --name A
 *   claims edit account --name A --conns 5 --data 10mib
 *   claims describe account --name A
 */

mod commands;
mod config;
mod parse;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::add::AddCommand;
use commands::delete::DeleteCommand;
use commands::describe::DescribeCommand;
use commands::edit::EditCommand;
use commands::Context;
use config::Config;

#[derive(Parser)]
#[command(name = "claims")]
#[command(about = "Edit operator, account and user claims")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Store directory, overrides CLAIMS_HOME
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Default account, overrides CLAIMS_ACCOUNT
    #[arg(long = "default-account", global = true)]
    default_account: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the operator
    Init {
        /// Operator name, defaults to CLAIMS_OPERATOR
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Add an account or user
    #[command(subcommand)]
    Add(AddCommand),
    /// Edit the operator, an account or a user
    #[command(subcommand)]
    Edit(EditCommand),
    /// Print a stored claim as JSON
    #[command(subcommand)]
    Describe(DescribeCommand),
    /// Delete a user
    #[command(subcommand)]
    Delete(DeleteCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".bold().red(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claims=info,claims_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(home) = cli.home {
        config.home = home;
    }
    if cli.default_account.is_some() {
        config.default_account = cli.default_account;
    }
    tracing::debug!(home = ?config.home, "Loaded configuration");

    let ctx = Context::open(config)?;
    match cli.command {
        Commands::Init { name } => commands::init::init(&ctx, name)?,
        Commands::Add(command) => commands::add::add(&ctx, command)?,
        Commands::Edit(command) => commands::edit::edit(&ctx, command)?,
        Commands::Describe(command) => commands::describe::describe(&ctx, command)?,
        Commands::Delete(command) => commands::delete::delete(&ctx, command)?,
    }

    Ok(())
}
