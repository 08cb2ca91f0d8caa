//! Policy decision point.
//!
//! Pure evaluation of an [`AbilitySet`] against a required action and
//! subject, either at type level (coarse pre-handler check) or against a
//! loaded record's authorization attributes (fine-grained post-load check).
//! No I/O, no mutation; everything evaluated is already in memory.

use tenura_security::scope::ScopeValue;

use crate::ability::AbilitySet;
use crate::error::AccessError;
use crate::rules::{Action, Effect, SubjectType};

/// A loaded record's authorization-relevant projection.
///
/// The subject kind is an explicit tag set by the data-access layer at load
/// time — never inferred from a runtime type name. Attributes carry only the
/// fields rule conditions inspect (id, owner, organization reference).
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectInstance {
    kind: SubjectType,
    attrs: Vec<(&'static str, ScopeValue)>,
}

impl SubjectInstance {
    /// Start building an instance of the given subject kind.
    #[must_use]
    pub fn of(kind: SubjectType) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
        }
    }

    /// Attach an authorization attribute.
    #[must_use]
    pub fn with(mut self, property: &'static str, value: impl Into<ScopeValue>) -> Self {
        self.attrs.push((property, value.into()));
        self
    }

    /// The subject kind tag.
    #[must_use]
    pub fn kind(&self) -> SubjectType {
        self.kind
    }

    /// The authorization attributes.
    #[must_use]
    pub fn attrs(&self) -> &[(&'static str, ScopeValue)] {
        &self.attrs
    }
}

impl AbilitySet {
    /// Coarse, type-level check: may this principal perform `action` on any
    /// instance of `subject`?
    ///
    /// A conditional rule still matches here — its condition narrows which
    /// instances are reachable, not whether the action exists for the type.
    /// Instance narrowing happens in [`AbilitySet::can_instance`].
    #[must_use]
    pub fn can(&self, action: Action, subject: SubjectType) -> bool {
        self.decide(action, subject, None)
    }

    /// Fine-grained check against a concrete loaded record.
    ///
    /// A conditional rule applies only when every condition filter holds for
    /// the instance attributes; a missing attribute fails the condition.
    #[must_use]
    pub fn can_instance(&self, action: Action, instance: &SubjectInstance) -> bool {
        self.decide(action, instance.kind(), Some(instance))
    }

    /// Result-typed form of [`AbilitySet::can`] for pre-handler enforcement.
    ///
    /// # Errors
    ///
    /// [`AccessError::ActionNotAllowed`] when the type-level check denies.
    pub fn enforce(&self, action: Action, subject: SubjectType) -> Result<(), AccessError> {
        if self.can(action, subject) {
            Ok(())
        } else {
            Err(AccessError::ActionNotAllowed { action, subject })
        }
    }

    /// Result-typed form of [`AbilitySet::can_instance`].
    ///
    /// On denial the already-loaded record must not be returned to the
    /// caller.
    ///
    /// # Errors
    ///
    /// [`AccessError::InstanceNotAllowed`] when the instance check denies.
    pub fn enforce_instance(
        &self,
        action: Action,
        instance: &SubjectInstance,
    ) -> Result<(), AccessError> {
        if self.can_instance(action, instance) {
            Ok(())
        } else {
            Err(AccessError::InstanceNotAllowed {
                action,
                subject: instance.kind(),
            })
        }
    }

    /// Ordered evaluation, last applicable rule wins, default deny.
    fn decide(
        &self,
        action: Action,
        subject: SubjectType,
        instance: Option<&SubjectInstance>,
    ) -> bool {
        let mut decision = false;
        for rule in self.rules() {
            if !rule.covers(action, subject) {
                continue;
            }
            let applies = match (&rule.condition, instance) {
                (None, _) | (Some(_), None) => true,
                (Some(condition), Some(inst)) => condition.holds_for(inst.attrs()),
            };
            if applies {
                decision = rule.effect == Effect::Allow;
            }
        }
        decision
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use tenura_security::scope::{ScopeConstraint, subject_properties};
    use uuid::Uuid;

    const ORG_A: &str = "11111111-1111-1111-1111-111111111111";
    const ORG_B: &str = "22222222-2222-2222-2222-222222222222";

    fn uid(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    #[test]
    fn default_decision_is_deny() {
        let ability = AbilitySet::from_rules(vec![]);
        assert!(!ability.can(Action::Read, SubjectType::Unit));
    }

    #[test]
    fn manage_all_covers_everything() {
        let ability = AbilitySet::from_rules(vec![Rule::allow(Action::Manage, SubjectType::All)]);

        assert!(ability.can(Action::Delete, SubjectType::Payment));
        assert!(ability.can_instance(
            Action::Update,
            &SubjectInstance::of(SubjectType::Unit).with(subject_properties::LANDLORD_ID, "x"),
        ));
    }

    #[test]
    fn last_match_wins_deny_after_allow() {
        let ability = AbilitySet::from_rules(vec![
            Rule::allow(Action::Manage, SubjectType::Unit),
            Rule::deny(Action::Delete, SubjectType::Unit),
        ]);
        let unit = SubjectInstance::of(SubjectType::Unit)
            .with(subject_properties::RESOURCE_ID, "u-1");

        assert!(!ability.can_instance(Action::Delete, &unit));
        assert!(ability.can_instance(Action::Update, &unit));
        assert!(!ability.can(Action::Delete, SubjectType::Unit));
        assert!(ability.can(Action::Update, SubjectType::Unit));
    }

    #[test]
    fn allow_after_deny_restores_access() {
        let ability = AbilitySet::from_rules(vec![
            Rule::deny(Action::Read, SubjectType::Property),
            Rule::allow(Action::Read, SubjectType::Property),
        ]);
        assert!(ability.can(Action::Read, SubjectType::Property));
    }

    #[test]
    fn conditional_rule_matches_at_type_level() {
        let ability = AbilitySet::from_rules(vec![Rule::allow_where(
            Action::Manage,
            SubjectType::Property,
            ScopeConstraint::field_eq(subject_properties::OWNER_ORG_ID, uid(ORG_A)),
        )]);

        assert!(ability.can(Action::Read, SubjectType::Property));
        assert!(ability.can(Action::Create, SubjectType::Property));
    }

    #[test]
    fn condition_gates_instance_check() {
        let ability = AbilitySet::from_rules(vec![Rule::allow_where(
            Action::Manage,
            SubjectType::Property,
            ScopeConstraint::field_eq(subject_properties::OWNER_ORG_ID, uid(ORG_A)),
        )]);

        let owned = SubjectInstance::of(SubjectType::Property)
            .with(subject_properties::OWNER_ORG_ID, uid(ORG_A));
        let foreign = SubjectInstance::of(SubjectType::Property)
            .with(subject_properties::OWNER_ORG_ID, uid(ORG_B));

        assert!(ability.can_instance(Action::Update, &owned));
        assert!(!ability.can_instance(Action::Update, &foreign));
    }

    #[test]
    fn condition_fails_without_attribute() {
        let ability = AbilitySet::from_rules(vec![Rule::allow_where(
            Action::Read,
            SubjectType::Property,
            ScopeConstraint::field_eq(subject_properties::OWNER_ORG_ID, uid(ORG_A)),
        )]);

        // Loaded record missing its owner attribute: fail-closed.
        let stripped = SubjectInstance::of(SubjectType::Property);
        assert!(!ability.can_instance(Action::Read, &stripped));
    }

    #[test]
    fn mixed_representation_ids_match_condition() {
        let ability = AbilitySet::from_rules(vec![Rule::allow_where(
            Action::Read,
            SubjectType::Organization,
            ScopeConstraint::field_eq(subject_properties::RESOURCE_ID, uid(ORG_A)),
        )]);

        // Instance attribute is the string form of the same UUID.
        let org = SubjectInstance::of(SubjectType::Organization)
            .with(subject_properties::RESOURCE_ID, ORG_A);
        assert!(ability.can_instance(Action::Read, &org));
    }

    #[test]
    fn enforce_maps_to_error_variants() {
        let ability = AbilitySet::from_rules(vec![Rule::allow(Action::Read, SubjectType::Unit)]);

        assert!(ability.enforce(Action::Read, SubjectType::Unit).is_ok());
        assert!(matches!(
            ability.enforce(Action::Delete, SubjectType::Unit),
            Err(AccessError::ActionNotAllowed {
                action: Action::Delete,
                subject: SubjectType::Unit,
            })
        ));

        let unit = SubjectInstance::of(SubjectType::Unit);
        assert!(matches!(
            ability.enforce_instance(Action::Delete, &unit),
            Err(AccessError::InstanceNotAllowed { .. })
        ));
    }
}
