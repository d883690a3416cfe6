/*!
 * Command implementations
 */

pub mod add;
pub mod args;
pub mod delete;
pub mod describe;
pub mod edit;
pub mod init;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::*;

use claims_core::{ClaimEditService, EditTarget};
use claims_policy::ConstraintCheckerImpl;
use claims_storage::{FileKeyVault, FileStore, KeyringSigner};

use crate::config::Config;
use crate::parse;

pub type TimeFn = fn(&str) -> std::result::Result<i64, String>;

pub type CliService = ClaimEditService<
    ConstraintCheckerImpl,
    FileStore,
    FileKeyVault,
    KeyringSigner<FileKeyVault>,
    TimeFn,
>;

/// Opened store and engine for one command
pub struct Context {
    pub config: Config,
    pub store: Arc<FileStore>,
    pub service: CliService,
}

impl Context {
    pub fn open(config: Config) -> Result<Self> {
        let store = Arc::new(
            FileStore::open(config.store_dir())
                .with_context(|| format!("opening claim store in {:?}", config.home))?,
        );
        let vault = Arc::new(
            FileKeyVault::open(config.keys_dir())
                .with_context(|| format!("opening key vault in {:?}", config.home))?,
        );
        let service = ClaimEditService::new(
            Arc::new(ConstraintCheckerImpl::new()),
            store.clone(),
            vault.clone(),
            Arc::new(KeyringSigner::new(vault)),
            Arc::new(parse::time as TimeFn),
        );
        Ok(Self {
            config,
            store,
            service,
        })
    }

    /// Account target with the configured default filled in
    pub fn target(&self, account: Option<String>, user: Option<String>) -> EditTarget {
        EditTarget {
            account,
            user,
            ..Default::default()
        }
        .with_default_account(self.config.default_account.clone())
    }
}

/// Print one line per applied change
pub fn print_summary(summary: &[String]) {
    for line in summary {
        println!("{} {}", "[ OK ]".green(), line);
    }
}
