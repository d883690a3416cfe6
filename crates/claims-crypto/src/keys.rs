//! Key categories, key pair generation and the text encoding of keys.
//!
//! Every key in the hierarchy is an Ed25519 key tagged with the category of
//! the entity it identifies. The text form carries that category as a one
//! letter prefix and a two byte checksum so that a key pasted into the wrong
//! place is rejected before it is ever stored in a claim.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::SigningKey;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::{constants::*, errors::*};

/// Category of an identity or signing key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyCategory {
    /// Root identity that issues accounts
    Operator,
    /// Tenant identity that issues users
    Account,
    /// Leaf credential
    User,
}

impl KeyCategory {
    /// One letter prefix used in the text encoding
    pub fn prefix(&self) -> char {
        match self {
            KeyCategory::Operator => 'O',
            KeyCategory::Account => 'A',
            KeyCategory::User => 'U',
        }
    }

    /// Inverse of [`KeyCategory::prefix`]
    pub fn from_prefix(prefix: char) -> Result<Self> {
        match prefix {
            'O' => Ok(KeyCategory::Operator),
            'A' => Ok(KeyCategory::Account),
            'U' => Ok(KeyCategory::User),
            other => Err(CryptoError::InvalidPrefix(other)),
        }
    }
}

impl fmt::Display for KeyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KeyCategory::Operator => "operator",
            KeyCategory::Account => "account",
            KeyCategory::User => "user",
        };
        write!(f, "{}", s)
    }
}

/// A categorized Ed25519 public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    category: KeyCategory,
    bytes: [u8; PUBLIC_KEY_SIZE],
}

impl PublicKey {
    /// Wrap raw key bytes
    pub fn new(category: KeyCategory, bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self { category, bytes }
    }

    /// Parse and validate the text form of any category
    pub fn parse(text: &str) -> Result<Self> {
        if !text.is_ascii() {
            return Err(CryptoError::InvalidEncoding("non-ascii key".to_string()));
        }
        if text.len() != ENCODED_PUBLIC_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: ENCODED_PUBLIC_KEY_LEN,
                actual: text.len(),
            });
        }
        let prefix = text.chars().next().ok_or(CryptoError::InvalidChecksum)?;
        let category = KeyCategory::from_prefix(prefix)?;
        let bytes = decode_checked(&text[..1], &text[1..])?;
        Ok(Self { category, bytes })
    }

    /// Category of the entity this key identifies
    pub fn category(&self) -> KeyCategory {
        self.category
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.bytes
    }

}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.category.prefix().to_string();
        write!(f, "{}", encode_checked(&prefix, &self.bytes))
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse a public key and require it to belong to `expected`
pub fn parse_public_key(text: &str, expected: KeyCategory) -> Result<PublicKey> {
    let key = PublicKey::parse(text)?;
    if key.category() != expected {
        return Err(CryptoError::WrongCategory {
            key: text.to_string(),
            expected,
        });
    }
    Ok(key)
}

/// Ed25519 key pair tagged with its category
///
/// The seed never leaves this type except through [`KeyPair::seed_text`],
/// which returns a zeroizing buffer.
#[derive(Clone)]
pub struct KeyPair {
    category: KeyCategory,
    signing_key: SigningKey,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("category", &self.category)
            .field("public_key", &self.public_key().to_string())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate a new key pair using a cryptographically secure RNG
    pub fn generate(category: KeyCategory) -> Result<Self> {
        let mut seed = Zeroizing::new([0u8; SEED_SIZE]);
        rand::thread_rng()
            .try_fill_bytes(&mut seed[..])
            .map_err(|e| CryptoError::RandomGenerationFailed(e.to_string()))?;
        Ok(Self::from_seed(category, &seed))
    }

    /// Build a key pair from raw seed bytes
    pub fn from_seed(category: KeyCategory, seed: &[u8; SEED_SIZE]) -> Self {
        Self {
            category,
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse the text form produced by [`KeyPair::seed_text`]
    pub fn from_seed_text(text: &str) -> Result<Self> {
        if !text.is_ascii() {
            return Err(CryptoError::InvalidEncoding("non-ascii seed".to_string()));
        }
        if text.len() != ENCODED_SEED_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: ENCODED_SEED_LEN,
                actual: text.len(),
            });
        }
        let mut chars = text.chars();
        match chars.next() {
            Some(SEED_PREFIX) => {}
            Some(other) => return Err(CryptoError::InvalidPrefix(other)),
            None => return Err(CryptoError::InvalidChecksum),
        }
        let prefix = chars.next().ok_or(CryptoError::InvalidChecksum)?;
        let category = KeyCategory::from_prefix(prefix)?;
        let seed = Zeroizing::new(decode_checked(&text[..2], &text[2..])?);
        Ok(Self::from_seed(category, &seed))
    }

    /// Text form of the seed, zeroized when dropped
    pub fn seed_text(&self) -> Zeroizing<String> {
        let prefix = format!("{}{}", SEED_PREFIX, self.category.prefix());
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        Zeroizing::new(encode_checked(&prefix, &seed[..]))
    }

    /// Category of this key pair
    pub fn category(&self) -> KeyCategory {
        self.category
    }

    /// Public half of this key pair
    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(self.category, self.signing_key.verifying_key().to_bytes())
    }

    /// PKCS#8 v1 DER encoding of the seed, as token encoders expect
    pub fn to_pkcs8_der(&self) -> Zeroizing<Vec<u8>> {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        let mut der = Zeroizing::new(Vec::with_capacity(PKCS8_ED25519_PREFIX.len() + SEED_SIZE));
        der.extend_from_slice(&PKCS8_ED25519_PREFIX);
        der.extend_from_slice(&seed[..]);
        der
    }
}

fn checksum(prefix: &str, body: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(body);
    let digest = hasher.finalize();
    [digest[0], digest[1]]
}

fn encode_checked(prefix: &str, body: &[u8]) -> String {
    let mut buf = Zeroizing::new(Vec::with_capacity(body.len() + CHECKSUM_SIZE));
    buf.extend_from_slice(body);
    buf.extend_from_slice(&checksum(prefix, body));
    format!("{}{}", prefix, hex::encode_upper(&buf[..]))
}

fn decode_checked(prefix: &str, encoded: &str) -> Result<[u8; 32]> {
    let raw = Zeroizing::new(
        hex::decode(encoded).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?,
    );
    if raw.len() != 32 + CHECKSUM_SIZE {
        return Err(CryptoError::InvalidEncoding(format!(
            "expected {} bytes, got {}",
            32 + CHECKSUM_SIZE,
            raw.len()
        )));
    }
    let (body, sum) = raw.split_at(32);
    if checksum(prefix, body) != sum {
        return Err(CryptoError::InvalidChecksum);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(body);
    Ok(out)
}
