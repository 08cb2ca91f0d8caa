#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Authorization engine for the property-management platform.
//!
//! Everything here evaluates in-process against the request's
//! [`Principal`](tenura_security::principal::Principal) — there is no
//! external policy service and no decision cache. The pieces compose in
//! request order:
//!
//! - [`ability`] derives the principal's ordered rule set once per request;
//! - [`decision`] answers can/cannot at type level or against a loaded
//!   record (last applicable rule wins, default deny);
//! - [`scoping`] translates the same rules into query filters and AND-s in
//!   the tenant boundary;
//! - [`guard`] runs the instance-level ownership check for resource-by-id
//!   endpoints, driven by the declarative [`metadata`] each route attaches.

pub mod ability;
pub mod decision;
pub mod error;
pub mod guard;
pub mod metadata;
pub mod rules;
pub mod scoping;

pub use ability::AbilitySet;
pub use decision::SubjectInstance;
pub use error::{AccessError, StoreError};
pub use guard::{OwnershipGuard, OwnershipStore, ResourceOwnerRef};
pub use metadata::{EndpointPolicy, OwnershipRequirement, RequestIdentifiers, RequiredPermission};
pub use rules::{Action, Effect, Rule, SubjectType};
pub use scoping::{TenantScope, scoped_query_filter};
