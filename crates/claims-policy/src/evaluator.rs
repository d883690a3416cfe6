//! Constraint evaluator logic.

use crate::{errors::PolicyError, types::*};

/// Pure evaluator over a [`ConstraintContext`]
pub struct ConstraintEvaluator;

impl ConstraintEvaluator {
    /// Evaluate the context and return a decision
    ///
    /// Evaluation order, first violation wins:
    /// 1. Account required
    /// 2. At least one edit option
    /// 3. No JetStream on the system account
    /// 4. Bearer guard (user create/edit under a disallowing account)
    /// 5. Bearer cascade (disallowing account with bearer users)
    pub fn evaluate(context: &ConstraintContext) -> ConstraintDecision {
        let mut audit_tags = vec![format!("entity:{:?}", context.entity)];

        // 1. Account required
        audit_tags.push(Rule::AccountRequired.tag().to_string());
        if context.account_required && context.account.is_none() {
            return Self::deny(
                Rule::AccountRequired,
                PolicyError::MissingAccountContext,
                audit_tags,
            );
        }

        // 2. At least one edit option
        if let Some(count) = context.requested_options {
            audit_tags.push(Rule::EditOptionRequired.tag().to_string());
            if count == 0 {
                return Self::deny(
                    Rule::EditOptionRequired,
                    PolicyError::NoOptionSpecified,
                    audit_tags,
                );
            }
        }

        // 3. System account never carries JetStream limits
        if context.system_account == Some(true) {
            audit_tags.push(Rule::SystemAccountJetStream.tag().to_string());
            if !context.jetstream_flags.is_empty() {
                return Self::deny(
                    Rule::SystemAccountJetStream,
                    PolicyError::SystemAccountJetStream {
                        account: Self::account_name(context),
                        flags: context.jetstream_flags.clone(),
                    },
                    audit_tags,
                );
            }
        }

        // 4. Bearer guard
        if let (Some(request), Some(true)) =
            (&context.bearer_request, context.account_disallows_bearer)
        {
            audit_tags.push(Rule::BearerGuard.tag().to_string());
            let account = Self::account_name(context);
            let violation = if request.creating {
                PolicyError::BearerForbidden { account }
            } else {
                PolicyError::BearerDisallowed { account }
            };
            return Self::deny(Rule::BearerGuard, violation, audit_tags);
        }

        // 5. Bearer cascade
        if context.disallow_bearer == Some(true) {
            audit_tags.push(Rule::BearerCascade.tag().to_string());
            let offender = context
                .child_users
                .iter()
                .flatten()
                .find(|user| user.bearer);
            if let Some(user) = offender {
                return Self::deny(
                    Rule::BearerCascade,
                    PolicyError::BearerConflict {
                        account: Self::account_name(context),
                        user: user.name.clone(),
                    },
                    audit_tags,
                );
            }
        }

        ConstraintDecision {
            verdict: Verdict::Allow,
            violation: None,
            denied_by: None,
            audit_tags,
        }
    }

    fn deny(rule: Rule, violation: PolicyError, mut audit_tags: Vec<String>) -> ConstraintDecision {
        audit_tags.push(format!("denied:{}", rule.tag()));
        ConstraintDecision {
            verdict: Verdict::Deny,
            violation: Some(violation),
            denied_by: Some(rule),
            audit_tags,
        }
    }

    fn account_name(context: &ConstraintContext) -> String {
        context.account.clone().unwrap_or_default()
    }
}
