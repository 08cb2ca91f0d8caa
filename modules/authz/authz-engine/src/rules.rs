//! Rule model for the ability engine.
//!
//! A rule grants or revokes one action on one subject type, optionally
//! narrowed by a condition over the resource's authorization attributes.
//! Rules are plain data (serde-serializable, like the scope types they
//! compile into) so rule sets can be inspected and asserted on directly.

use serde::{Deserialize, Serialize};
use tenura_security::scope::{ScopeConstraint, subject_properties};

/// An action a principal may perform on a subject.
///
/// `Manage` subsumes every other action on the same subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Manage,
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    /// Whether a rule carrying this action applies to the required action.
    #[must_use]
    pub fn covers(self, required: Self) -> bool {
        self == Self::Manage || self == required
    }
}

/// A resource type rules apply to. `All` subsumes every subject type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    User,
    Organization,
    Property,
    Unit,
    Lease,
    Task,
    Inquiry,
    Payment,
    All,
}

impl SubjectType {
    /// Whether a rule carrying this subject applies to the required subject.
    #[must_use]
    pub fn covers(self, required: Self) -> bool {
        self == Self::All || self == required
    }

    /// The tenant-reference property of this subject type, used to layer the
    /// landlord boundary onto query filters.
    ///
    /// `None` for `All`: a concrete subject must be named before a tenant
    /// filter can be attached.
    #[must_use]
    pub fn tenant_property(self) -> Option<&'static str> {
        match self {
            Self::Property => Some(subject_properties::OWNER_ORG_ID),
            Self::Unit => Some(subject_properties::LANDLORD_ID),
            Self::Organization => Some(subject_properties::RESOURCE_ID),
            Self::User | Self::Lease | Self::Task | Self::Inquiry | Self::Payment => {
                Some(subject_properties::ORG_ID)
            }
            Self::All => None,
        }
    }
}

/// Whether a rule grants or revokes access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Allow,
    Deny,
}

/// One allow/deny rule in an ability set.
///
/// The condition, when present, is a conjunction of field filters the
/// concrete resource must satisfy for the rule to apply at instance level.
/// At type level a conditional rule still matches — the condition narrows
/// which instances, not whether the action exists for the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub effect: Effect,
    pub action: Action,
    pub subject: SubjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ScopeConstraint>,
}

impl Rule {
    /// An unconditional allow rule.
    #[must_use]
    pub fn allow(action: Action, subject: SubjectType) -> Self {
        Self {
            effect: Effect::Allow,
            action,
            subject,
            condition: None,
        }
    }

    /// An allow rule narrowed by a condition.
    #[must_use]
    pub fn allow_where(action: Action, subject: SubjectType, condition: ScopeConstraint) -> Self {
        Self {
            effect: Effect::Allow,
            action,
            subject,
            condition: Some(condition),
        }
    }

    /// An unconditional deny rule.
    #[must_use]
    pub fn deny(action: Action, subject: SubjectType) -> Self {
        Self {
            effect: Effect::Deny,
            action,
            subject,
            condition: None,
        }
    }

    /// Whether this rule applies to the required action/subject pair.
    #[must_use]
    pub fn covers(&self, action: Action, subject: SubjectType) -> bool {
        self.action.covers(action) && self.subject.covers(subject)
    }
}
