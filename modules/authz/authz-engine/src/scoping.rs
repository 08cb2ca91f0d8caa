//! Record scoping translator.
//!
//! Converts an ability's rules for one action/subject pair into a composable
//! [`AccessScope`] the persistence layer can merge with its other filters
//! (search terms, pagination, soft-delete exclusion) without re-running rule
//! evaluation per candidate record.
//!
//! The unconditional grants in the ability templates (e.g. landlord
//! `Manage Unit`) are only tenant-safe because the landlord boundary is
//! AND-ed in before the query runs. [`scoped_query_filter`] is the one
//! entry point for list/search queries and takes both the ability and the
//! tenant scope, so neither can be applied without the other.

use tenura_security::principal::Principal;
use tenura_security::scope::{AccessScope, ScopeConstraint, ScopeFilter};
use tenura_security::tenancy::{TenancyError, resolve_landlord_context};
use uuid::Uuid;

use crate::ability::AbilitySet;
use crate::rules::{Action, Effect, SubjectType};

impl AbilitySet {
    /// Translate the rules matching `action` on `subject` into a query
    /// predicate.
    ///
    /// Allow-rule conditions become access paths (OR-ed); an unconditional
    /// Allow makes the scope unconstrained. Deny-rule conditions become
    /// exclusions; an unconditional Deny revokes everything granted before
    /// it (last-match-wins, same ordering semantics as the decision point).
    ///
    /// With no applicable Allow the result is `deny_all()` — a filter that
    /// matches nothing. Listing endpoints degrade to an empty result set;
    /// they never throw from an unsatisfiable scope.
    #[must_use]
    pub fn scope_for(&self, action: Action, subject: SubjectType) -> AccessScope {
        let mut unconstrained = false;
        let mut paths: Vec<ScopeConstraint> = Vec::new();
        let mut exclusions: Vec<ScopeConstraint> = Vec::new();

        for rule in self.rules() {
            if !rule.covers(action, subject) {
                continue;
            }
            match (rule.effect, &rule.condition) {
                (Effect::Allow, None) => {
                    // Regrants everything, including records a conditional
                    // Deny excluded earlier (last-match-wins).
                    unconstrained = true;
                    paths.clear();
                    exclusions.clear();
                }
                (Effect::Allow, Some(condition)) => {
                    if !unconstrained {
                        paths.push(condition.clone());
                    }
                }
                (Effect::Deny, None) => {
                    // Revokes everything declared before it.
                    unconstrained = false;
                    paths.clear();
                    exclusions.clear();
                }
                (Effect::Deny, Some(condition)) => {
                    if unconstrained || !paths.is_empty() {
                        exclusions.push(condition.clone());
                    }
                }
            }
        }

        let scope = if unconstrained {
            AccessScope::allow_all()
        } else if paths.is_empty() {
            return AccessScope::deny_all();
        } else {
            AccessScope::from_constraints(paths)
        };
        exclusions.into_iter().fold(scope, AccessScope::with_exclusion)
    }
}

/// The tenant boundary applied to every list/search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    /// No boundary (super-admin only).
    Unrestricted,
    /// Scope every query to this landlord organization.
    Org(Uuid),
}

impl TenantScope {
    /// Derive the tenant scope for a principal.
    ///
    /// Admins get an unrestricted scope. Landlord principals are scoped to
    /// their landlord organization. Other org types carry no landlord
    /// boundary — their rule conditions do the narrowing — and resolve to
    /// `Unrestricted`.
    ///
    /// # Errors
    ///
    /// [`TenancyError::MissingOrganization`] for a malformed landlord
    /// principal. Fatal: defaulting here could leak cross-tenant data.
    pub fn for_principal(principal: &Principal) -> Result<Self, TenancyError> {
        if principal.is_admin() {
            return Ok(Self::Unrestricted);
        }
        match resolve_landlord_context(principal) {
            Ok(ctx) => Ok(Self::Org(ctx.landlord_id())),
            Err(TenancyError::NotLandlord { .. }) => Ok(Self::Unrestricted),
            Err(err @ TenancyError::MissingOrganization) => Err(err),
        }
    }
}

/// Build the complete query filter for a list/search operation.
///
/// AND-s the tenant boundary into every access path of the ability-derived
/// scope. Taking both inputs in one signature is deliberate: a broad grant
/// like landlord `Manage Unit` must never reach the persistence layer
/// without its tenant filter.
#[must_use]
pub fn scoped_query_filter(
    ability: &AbilitySet,
    tenant: &TenantScope,
    action: Action,
    subject: SubjectType,
) -> AccessScope {
    let scope = ability.scope_for(action, subject);
    match (tenant, subject.tenant_property()) {
        (TenantScope::Org(org_id), Some(property)) => {
            scope.and_filter(ScopeFilter::eq(property, *org_id))
        }
        (TenantScope::Org(_), None) | (TenantScope::Unrestricted, _) => scope,
    }
}
