use anyhow::Result;
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory holding the claim store and key vault
    pub home: PathBuf,

    /// Account used when a command names none
    pub default_account: Option<String>,

    /// Operator name used by `init`
    pub operator_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let home = std::env::var("CLAIMS_HOME")
            .unwrap_or_else(|_| "./.claims".to_string())
            .into();

        let default_account = std::env::var("CLAIMS_ACCOUNT")
            .ok()
            .filter(|name| !name.trim().is_empty());

        let operator_name =
            std::env::var("CLAIMS_OPERATOR").unwrap_or_else(|_| "operator".to_string());
        if operator_name.trim().is_empty() {
            anyhow::bail!("CLAIMS_OPERATOR must not be empty");
        }

        Ok(Config {
            home,
            default_account,
            operator_name,
        })
    }

    pub fn store_dir(&self) -> PathBuf {
        self.home.join("store")
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.home.join("keys")
    }
}
