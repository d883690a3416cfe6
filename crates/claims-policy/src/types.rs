//! Constraint checker type definitions.

use serde::{Deserialize, Serialize};

/// Kind of entity being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Operator,
    Account,
    User,
}

/// A user issued by the account under edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildUser {
    pub name: String,
    pub bearer: bool,
}

/// A request to make a user a bearer user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerRequest {
    pub user: String,
    /// `true` when the user is being created, `false` for an edit
    pub creating: bool,
}

/// Facts a constraint evaluation runs against
///
/// Optional entity states follow one rule: `None` means the corresponding
/// check is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintContext {
    // Target
    pub entity: EntityKind,
    pub account_required: bool,
    pub account: Option<String>,

    // Requested options
    pub requested_options: Option<usize>,
    pub jetstream_flags: Vec<String>,

    // Entity states
    pub system_account: Option<bool>,
    pub disallow_bearer: Option<bool>,
    pub child_users: Option<Vec<ChildUser>>,
    pub bearer_request: Option<BearerRequest>,
    pub account_disallows_bearer: Option<bool>,
}

impl ConstraintContext {
    /// Context for an operator edit
    pub fn operator() -> Self {
        Self::empty(EntityKind::Operator, false, None)
    }

    /// Context for an account edit; the account is required
    pub fn account(account: Option<String>) -> Self {
        Self::empty(EntityKind::Account, true, account)
    }

    /// Context for a user edit or creation under `account`
    pub fn user(account: impl Into<String>) -> Self {
        Self::empty(EntityKind::User, true, Some(account.into()))
    }

    fn empty(entity: EntityKind, account_required: bool, account: Option<String>) -> Self {
        Self {
            entity,
            account_required,
            account,
            requested_options: None,
            jetstream_flags: Vec::new(),
            system_account: None,
            disallow_bearer: None,
            child_users: None,
            bearer_request: None,
            account_disallows_bearer: None,
        }
    }

    /// Record how many edit options were supplied
    pub fn with_requested_options(mut self, count: usize) -> Self {
        self.requested_options = Some(count);
        self
    }

    /// Record the JetStream flags requested and whether the target is the
    /// operator's system account
    pub fn with_jetstream(mut self, system_account: bool, flags: Vec<String>) -> Self {
        self.system_account = Some(system_account);
        self.jetstream_flags = flags;
        self
    }

    /// Record that the edit disallows bearer tokens, with the account's users
    pub fn with_disallow_bearer(mut self, children: Vec<ChildUser>) -> Self {
        self.disallow_bearer = Some(true);
        self.child_users = Some(children);
        self
    }

    /// Record a bearer request against the parent account's setting
    pub fn with_bearer_request(mut self, request: BearerRequest, account_disallows: bool) -> Self {
        self.bearer_request = Some(request);
        self.account_disallows_bearer = Some(account_disallows);
        self
    }
}

/// Constraint verdict
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Allow = 0x01,
    Deny = 0x02,
}

/// Rules in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    AccountRequired,
    EditOptionRequired,
    SystemAccountJetStream,
    BearerGuard,
    BearerCascade,
}

impl Rule {
    /// Audit tag recorded when the rule was evaluated
    pub fn tag(&self) -> &'static str {
        match self {
            Rule::AccountRequired => "account_required",
            Rule::EditOptionRequired => "edit_option_required",
            Rule::SystemAccountJetStream => "system_account_jetstream",
            Rule::BearerGuard => "bearer_guard",
            Rule::BearerCascade => "bearer_cascade",
        }
    }
}

/// Outcome of a constraint evaluation
#[derive(Debug, Clone)]
pub struct ConstraintDecision {
    pub verdict: Verdict,
    pub violation: Option<crate::PolicyError>,
    pub denied_by: Option<Rule>,
    pub audit_tags: Vec<String>,
}

impl ConstraintDecision {
    pub fn is_allowed(&self) -> bool {
        self.verdict == Verdict::Allow
    }
}
