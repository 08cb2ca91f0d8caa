//! Tenancy context resolution and principal classification.
//!
//! The tenant boundary of this system is the landlord organization: every
//! data query issued on behalf of a landlord-type principal is scoped to its
//! landlord ID. Resolution is a pure function of the [`Principal`] — no I/O,
//! no fallback. Silently defaulting on a malformed principal would risk
//! leaking cross-tenant data, so both failure modes are explicit and
//! distinguishable.

use uuid::Uuid;

use crate::principal::{OrgType, Principal, Role};

/// The tenant (landlord) boundary derived from a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    landlord_id: Uuid,
}

impl TenantContext {
    /// The landlord organization ID that scopes all queries.
    #[must_use]
    pub fn landlord_id(&self) -> Uuid {
        self.landlord_id
    }
}

/// Failure to derive a tenant context from a principal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenancyError {
    /// The principal's organization is not a landlord organization.
    #[error("principal is not a landlord")]
    NotLandlord {
        /// The organization type the principal actually carries, if any.
        org_type: Option<OrgType>,
    },

    /// The principal claims a landlord organization type but carries no
    /// organization ID. Indicates an upstream authentication bug.
    #[error("principal has no organization")]
    MissingOrganization,
}

/// Derive the landlord tenant context for a principal.
///
/// Only resolvable for principals whose organization type is
/// [`OrgType::Landlord`]. No other validation is performed.
///
/// # Errors
///
/// - [`TenancyError::NotLandlord`] when the organization type is absent or
///   not `Landlord`.
/// - [`TenancyError::MissingOrganization`] when the type is `Landlord` but
///   the organization ID is absent (malformed principal; logged as a
///   warning because it points at an authentication-layer bug).
pub fn resolve_landlord_context(principal: &Principal) -> Result<TenantContext, TenancyError> {
    match principal.organization_type() {
        Some(OrgType::Landlord) => match principal.organization_id() {
            Some(landlord_id) => Ok(TenantContext { landlord_id }),
            None => {
                tracing::warn!(
                    principal_id = %principal.id(),
                    "landlord principal without organization id; upstream authentication bug?"
                );
                Err(TenancyError::MissingOrganization)
            }
        },
        org_type => Err(TenancyError::NotLandlord { org_type }),
    }
}

/// Classification of a principal by organization kind and role.
///
/// The organization predicates are mutually exclusive for any well-formed
/// principal; `is_super_admin` depends only on the role and may coexist with
/// none of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub is_landlord: bool,
    pub is_property_manager: bool,
    pub is_tenant: bool,
    pub is_contractor: bool,
    pub is_super_admin: bool,
}

/// Classify a principal.
#[must_use]
pub fn classify(principal: &Principal) -> Classification {
    let mut class = Classification {
        is_super_admin: principal.role() == Role::SuperAdmin,
        ..Classification::default()
    };
    match principal.organization_type() {
        Some(OrgType::Landlord) => class.is_landlord = true,
        Some(OrgType::PropertyManager) => class.is_property_manager = true,
        Some(OrgType::Tenant) => class.is_tenant = true,
        Some(OrgType::Contractor) => class.is_contractor = true,
        None => {}
    }
    class
}
