use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global role of an authenticated caller.
///
/// Organization-level permissions are derived from [`OrgType`], not from the
/// role. The role only distinguishes platform operators from everyone else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A regular user. Effective permissions come from the organization.
    #[default]
    Regular,
    /// A platform operator with unrestricted access.
    SuperAdmin,
}

/// Kind of organization a principal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgType {
    /// Property-owning organization. Defines the tenant boundary for scoping.
    Landlord,
    /// Managing agent operating units on behalf of landlords.
    PropertyManager,
    /// Renter-side organization (read-only over the portfolio).
    Tenant,
    /// Maintenance contractor (read-only over the portfolio).
    Contractor,
}

/// `Principal` is the normalized view of the authenticated caller.
///
/// Built by the authentication layer from verified credentials and passed
/// through the request lifecycle. Constructed fresh per request, never
/// persisted by the authorization engine, and immutable for the request's
/// duration.
///
/// Invariant: when `organization_type` is set, `organization_id` must be set
/// too. The builder does not reject a violation (the principal comes from a
/// trusted upstream layer); the tenancy resolver detects the malformed case
/// and reports it as a distinct error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// The authenticated user's ID.
    id: Uuid,
    /// Global role.
    role: Role,
    /// The organization the user belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_id: Option<Uuid>,
    /// Kind of that organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_type: Option<OrgType>,
    /// Platform-admin flag asserted by the authentication layer.
    #[serde(default)]
    is_admin: bool,
}

impl Principal {
    /// Create a new `Principal` builder.
    #[must_use]
    pub fn builder(id: Uuid) -> PrincipalBuilder {
        PrincipalBuilder {
            id,
            role: Role::Regular,
            organization_id: None,
            organization_type: None,
            is_admin: false,
        }
    }

    /// The authenticated user's ID.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The principal's global role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The principal's organization ID, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<Uuid> {
        self.organization_id
    }

    /// The kind of the principal's organization, if any.
    #[must_use]
    pub fn organization_type(&self) -> Option<OrgType> {
        self.organization_type
    }

    /// Whether the authentication layer flagged this principal as an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

pub struct PrincipalBuilder {
    id: Uuid,
    role: Role,
    organization_id: Option<Uuid>,
    organization_type: Option<OrgType>,
    is_admin: bool,
}

impl PrincipalBuilder {
    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Attach an organization membership.
    #[must_use]
    pub fn organization(mut self, id: Uuid, org_type: OrgType) -> Self {
        self.organization_id = Some(id);
        self.organization_type = Some(org_type);
        self
    }

    /// Set only the organization type. Used to model malformed principals in
    /// tests; production principals always carry the matching ID.
    #[must_use]
    pub fn organization_type(mut self, org_type: OrgType) -> Self {
        self.organization_type = Some(org_type);
        self
    }

    #[must_use]
    pub fn is_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    #[must_use]
    pub fn build(self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
            organization_id: self.organization_id,
            organization_type: self.organization_type,
            is_admin: self.is_admin,
        }
    }
}
