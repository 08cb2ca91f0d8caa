#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod principal;
pub mod scope;
pub mod tenancy;

pub use principal::{OrgType, Principal, PrincipalBuilder, Role};
pub use scope::{AccessScope, ScopeConstraint, ScopeFilter, ScopeValue, subject_properties};
pub use tenancy::{Classification, TenancyError, TenantContext, classify, resolve_landlord_context};
