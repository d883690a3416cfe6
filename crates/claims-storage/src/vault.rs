//! Private key storage.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use claims_core::{KeyVault, StoreError, StoreResult};
use claims_crypto::KeyPair;
use tracing::debug;
use zeroize::Zeroizing;

const SEED_EXTENSION: &str = "nk";

/// Seeds kept as `<PUBLIC KEY>.nk` files in a directory
pub struct FileKeyVault {
    dir: PathBuf,
}

impl FileKeyVault {
    pub fn open<P: AsRef<Path>>(dir: P) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Opened key vault at {:?}", dir);
        Ok(Self { dir })
    }

    fn seed_path(&self, public_key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", public_key, SEED_EXTENSION))
    }
}

impl KeyVault for FileKeyVault {
    fn store(&self, keypair: &KeyPair) -> StoreResult<()> {
        let public = keypair.public_key().to_string();
        let seed = keypair.seed_text();
        fs::write(self.seed_path(&public), seed.as_bytes())?;
        debug!(key = %public, "Stored key");
        Ok(())
    }

    fn get(&self, public_key: &str) -> StoreResult<Option<KeyPair>> {
        // Public keys are a prefix letter and upper-case hex; nothing else names a seed file
        if public_key.is_empty() || !public_key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Ok(None);
        }
        let text = match fs::read_to_string(self.seed_path(public_key)) {
            Ok(text) => Zeroizing::new(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let keypair = KeyPair::from_seed_text(text.trim())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Some(keypair))
    }
}

/// In-memory vault
#[derive(Default)]
pub struct MemoryKeyVault {
    seeds: RwLock<HashMap<String, Zeroizing<String>>>,
}

impl MemoryKeyVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyVault for MemoryKeyVault {
    fn store(&self, keypair: &KeyPair) -> StoreResult<()> {
        self.seeds
            .write()
            .map_err(|_| poisoned())?
            .insert(keypair.public_key().to_string(), keypair.seed_text());
        Ok(())
    }

    fn get(&self, public_key: &str) -> StoreResult<Option<KeyPair>> {
        let seeds = self.seeds.read().map_err(|_| poisoned())?;
        seeds
            .get(public_key)
            .map(|seed| KeyPair::from_seed_text(seed))
            .transpose()
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

pub(crate) fn poisoned() -> StoreError {
    StoreError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        "lock poisoned",
    ))
}
