//! Ability construction.
//!
//! An [`AbilitySet`] is the ordered allow/deny rule list computed for one
//! principal. It is rebuilt from the principal on every request — never
//! cached across requests — so role or membership changes take effect
//! immediately and there is no invalidation to get wrong. Construction
//! never fails; a principal with no organization simply gets the
//! self-profile rules and nothing else.

use tenura_security::principal::{OrgType, Principal};
use tenura_security::scope::{ScopeConstraint, subject_properties};
use uuid::Uuid;

use crate::rules::{Action, Rule, SubjectType};

/// The ordered rule set scoped to one principal.
///
/// Rules are evaluated in declaration order and the last matching rule wins:
/// a broad `Allow` followed by a narrower `Deny` revokes access for the
/// narrower case. With no matching rule the decision is deny.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilitySet {
    rules: Vec<Rule>,
}

impl AbilitySet {
    /// Build the ability set for a principal.
    ///
    /// Admin principals get a single `Manage All` grant and nothing else.
    /// Everyone else gets self-profile access plus the template for their
    /// organization type.
    #[must_use]
    pub fn for_principal(principal: &Principal) -> Self {
        let mut rules = Vec::new();

        if principal.is_admin() {
            rules.push(Rule::allow(Action::Manage, SubjectType::All));
            return Self { rules };
        }

        // Self-profile access, independent of any organization.
        let self_cond = ScopeConstraint::field_eq(subject_properties::RESOURCE_ID, principal.id());
        rules.push(Rule::allow_where(
            Action::Read,
            SubjectType::User,
            self_cond.clone(),
        ));
        rules.push(Rule::allow_where(Action::Update, SubjectType::User, self_cond));

        if let (Some(org_id), Some(org_type)) =
            (principal.organization_id(), principal.organization_type())
        {
            match org_type {
                OrgType::Landlord => landlord_rules(&mut rules, org_id),
                OrgType::PropertyManager => property_manager_rules(&mut rules, org_id),
                OrgType::Tenant => tenant_rules(&mut rules, org_id),
                OrgType::Contractor => contractor_rules(&mut rules, org_id),
            }
        }

        Self { rules }
    }

    /// Construct an ability set from explicit rules. Intended for tests and
    /// for declarative policy fixtures; production rule sets come from
    /// [`AbilitySet::for_principal`].
    #[must_use]
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn own_org(org_id: Uuid) -> ScopeConstraint {
    ScopeConstraint::field_eq(subject_properties::RESOURCE_ID, org_id)
}

fn org_members(org_id: Uuid) -> ScopeConstraint {
    ScopeConstraint::field_eq(subject_properties::ORG_ID, org_id)
}

fn landlord_rules(rules: &mut Vec<Rule>, org_id: Uuid) {
    rules.push(Rule::allow_where(
        Action::Read,
        SubjectType::Organization,
        own_org(org_id),
    ));
    rules.push(Rule::allow_where(
        Action::Update,
        SubjectType::Organization,
        own_org(org_id),
    ));
    rules.push(Rule::allow_where(
        Action::Manage,
        SubjectType::User,
        org_members(org_id),
    ));
    rules.push(Rule::allow_where(
        Action::Manage,
        SubjectType::Property,
        ScopeConstraint::field_eq(subject_properties::OWNER_ORG_ID, org_id),
    ));
    // Unit grants are intentionally unconditional; the landlord boundary is
    // layered on by the scoping translator before queries run.
    rules.push(Rule::allow(Action::Manage, SubjectType::Unit));
    // Redundant with Manage, kept for engines that do not imply Read from it.
    rules.push(Rule::allow(Action::Read, SubjectType::Unit));
}

fn property_manager_rules(rules: &mut Vec<Rule>, org_id: Uuid) {
    rules.push(Rule::allow_where(
        Action::Read,
        SubjectType::Organization,
        own_org(org_id),
    ));
    rules.push(Rule::allow_where(
        Action::Update,
        SubjectType::Organization,
        own_org(org_id),
    ));
    rules.push(Rule::allow_where(
        Action::Manage,
        SubjectType::User,
        org_members(org_id),
    ));
    // No Property-level grant for property managers. Known gap in the
    // product rules; left as-is pending a product decision.
    rules.push(Rule::allow(Action::Manage, SubjectType::Unit));
    rules.push(Rule::allow(Action::Read, SubjectType::Unit));
}

fn tenant_rules(rules: &mut Vec<Rule>, org_id: Uuid) {
    rules.push(Rule::allow_where(
        Action::Read,
        SubjectType::Organization,
        own_org(org_id),
    ));
    rules.push(Rule::allow_where(
        Action::Read,
        SubjectType::User,
        org_members(org_id),
    ));
    rules.push(Rule::allow(Action::Read, SubjectType::Property));
    rules.push(Rule::allow(Action::Read, SubjectType::Unit));
    // Read-only: explicit denials keep the broad Manage templates used for
    // other org types from ever propagating here.
    for action in [Action::Create, Action::Update, Action::Delete] {
        rules.push(Rule::deny(action, SubjectType::Property));
    }
    for action in [Action::Create, Action::Update, Action::Delete] {
        rules.push(Rule::deny(action, SubjectType::Unit));
    }
}

fn contractor_rules(rules: &mut Vec<Rule>, org_id: Uuid) {
    rules.push(Rule::allow_where(
        Action::Read,
        SubjectType::Organization,
        own_org(org_id),
    ));
    rules.push(Rule::allow(Action::Read, SubjectType::Property));
    rules.push(Rule::allow(Action::Read, SubjectType::Unit));
    // No Delete-Property denial here: contractors never receive a delete
    // grant, so there is nothing for it to revoke.
    for action in [Action::Create, Action::Update] {
        rules.push(Rule::deny(action, SubjectType::Property));
    }
    for action in [Action::Create, Action::Update, Action::Delete] {
        rules.push(Rule::deny(action, SubjectType::Unit));
    }
}
