//! Error types for the authorization engine.
//!
//! Denials are expected, frequent, user-facing outcomes — the calling layer
//! maps them to a 403 with the short reason string from `Display` and moves
//! on. None of them are retried and none are logged as application errors;
//! the one upstream-bug case (malformed principal) is logged where it is
//! detected, in the tenancy resolver.

use thiserror::Error;

use crate::rules::{Action, SubjectType};
use tenura_security::tenancy::TenancyError;

/// Infrastructure failure while loading an ownership reference.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying lookup failed.
    #[error("ownership lookup failed: {0}")]
    Lookup(String),
}

/// An authorization decision or a failure to reach one.
///
/// The ownership-mismatch message deliberately carries no identifiers:
/// internal ownership values must not be echoed back to the caller.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No principal was present on a guarded endpoint.
    #[error("authentication required")]
    Unauthenticated,

    /// Type-level denial, before any data was loaded.
    #[error("not permitted to {action:?} {subject:?}")]
    ActionNotAllowed {
        action: Action,
        subject: SubjectType,
    },

    /// Instance-level denial, after the resource was loaded. The loaded data
    /// must not be returned to the caller.
    #[error("not permitted to {action:?} this {subject:?}")]
    InstanceNotAllowed {
        action: Action,
        subject: SubjectType,
    },

    /// The resource's owning organization does not match the caller's tenant
    /// context.
    #[error("not permitted to access this resource")]
    OwnershipMismatch,

    /// The guard could not find a resource identifier to check. A caller
    /// error, not a data error.
    #[error("resource id not found in request (expected parameter '{param}')")]
    MissingResourceId { param: &'static str },

    /// Tenant context could not be derived from the principal.
    #[error(transparent)]
    Tenancy(#[from] TenancyError),

    /// The ownership lookup itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
