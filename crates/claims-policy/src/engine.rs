//! Constraint checker trait and implementation.

use crate::{errors::Result, evaluator::ConstraintEvaluator, types::*};

/// Checks trust constraints before and after a claim edit
pub trait ConstraintChecker: Send + Sync {
    /// Evaluate the context; a denial is returned as the violation
    fn check(&self, context: ConstraintContext) -> Result<ConstraintDecision>;
}

/// Default constraint checker backed by [`ConstraintEvaluator`]
#[derive(Debug, Clone, Default)]
pub struct ConstraintCheckerImpl;

impl ConstraintCheckerImpl {
    /// Create a new constraint checker
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintChecker for ConstraintCheckerImpl {
    fn check(&self, context: ConstraintContext) -> Result<ConstraintDecision> {
        let decision = ConstraintEvaluator::evaluate(&context);

        match (&decision.verdict, &decision.violation) {
            (Verdict::Deny, Some(violation)) => {
                tracing::warn!(
                    entity = ?context.entity,
                    account = context.account.as_deref().unwrap_or(""),
                    rule = decision.denied_by.map(|r| r.tag()).unwrap_or(""),
                    "Constraint denied edit: {}",
                    violation
                );
                Err(violation.clone())
            }
            _ => {
                tracing::debug!(
                    entity = ?context.entity,
                    tags = ?decision.audit_tags,
                    "Constraints satisfied"
                );
                Ok(decision)
            }
        }
    }
}
