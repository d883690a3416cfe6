//! # claims-crypto
//!
//! Cryptographic primitives for the Operator → Account → User trust hierarchy.
//!
//! This crate provides:
//! - Key categories and the checksummed text encoding of public keys and seeds
//! - Ed25519 key pair generation
//! - PKCS#8 export of seeds for EdDSA token signing
//!
//! ## Security Properties
//!
//! - Seeds are zeroized on drop
//! - No unsafe code

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod errors;
pub mod keys;
pub mod utils;

pub use constants::*;
pub use errors::{CryptoError, Result};
pub use keys::{parse_public_key, KeyCategory, KeyPair, PublicKey};
pub use utils::current_timestamp;
