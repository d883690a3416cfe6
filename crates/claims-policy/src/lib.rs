//! # claims-policy
//!
//! Trust constraints evaluated around every claim edit:
//! - an account edit must resolve a target account
//! - an edit must request at least one change
//! - the system account never carries JetStream limits
//! - bearer tokens are refused under accounts that disallow them

#![warn(clippy::all)]

pub mod engine;
pub mod errors;
pub mod evaluator;
pub mod types;

pub use engine::{ConstraintChecker, ConstraintCheckerImpl};
pub use errors::{PolicyError, Result};
pub use evaluator::ConstraintEvaluator;
pub use types::*;
