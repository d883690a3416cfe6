//! # claims-storage
//!
//! Storage backends for the claims editing engine.
//!
//! This crate provides:
//! - [`FileStore`]: claims and tokens as JSON files under a directory
//! - [`MemoryStore`]: in-memory claims for tests and embedding
//! - [`FileKeyVault`] and [`MemoryKeyVault`]: private key storage
//! - [`KeyringSigner`]: signs claims as EdDSA JWTs with keys from a vault

#![warn(clippy::all)]

pub mod file_store;
pub mod memory_store;
pub mod record;
pub mod signer;
pub mod vault;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use record::StoredClaim;
pub use signer::{decode_claim, KeyringSigner, TokenPayload};
pub use vault::{FileKeyVault, MemoryKeyVault};
