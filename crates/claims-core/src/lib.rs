//! # claims-core
//!
//! Claims editing and validation engine for the Operator → Account → User
//! trust hierarchy.
//!
//! This crate is responsible for:
//! - The claim data model and requested changes
//! - Sub-editors for tags, permissions, limits, signing keys and validity
//! - The claim mutation orchestrator that validates, signs and commits edits

#![warn(clippy::all)]

pub mod changes;
pub mod errors;
pub mod limits;
pub mod permissions;
pub mod service;
pub mod signing_keys;
pub mod tags;
pub mod traits;
pub mod types;
pub mod validity;

pub use changes::*;
pub use errors::{
    EditError, ExclusiveJsOption, JsModeConflict, Result, SigningError, StoreError, StoreResult,
};
pub use service::ClaimEditService;
pub use traits::{validate_name, ClaimEditor, ClaimSigner, ClaimStore, KeyVault, TimeParser};
pub use types::*;
