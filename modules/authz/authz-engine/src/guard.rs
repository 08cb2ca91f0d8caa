//! Ownership guard.
//!
//! The instance-level check for singular resource-by-id endpoints: resolve
//! the resource identifier from the request, load only the resource's
//! ownership reference, and deny unless it matches the caller's landlord
//! context. One canonical state machine with exactly two terminal states
//! (allow, deny-with-reason); no retries, no caching of decisions.

use std::sync::Arc;

use async_trait::async_trait;
use tenura_security::principal::Principal;
use tenura_security::scope::ScopeValue;
use tenura_security::tenancy::resolve_landlord_context;

use crate::error::{AccessError, StoreError};
use crate::metadata::{EndpointPolicy, RequestIdentifiers};
use crate::rules::SubjectType;

/// Minimal ownership projection of a stored entity: just enough to authorize
/// it, never the full record.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceOwnerRef {
    /// The resource's own identifier.
    pub id: ScopeValue,
    /// The owning/landlord organization reference, when the entity has one.
    pub owner: Option<ScopeValue>,
}

/// Port to the persistence layer for ownership lookups.
///
/// Implementations load the single ownership field of the identified
/// entity (`Property.owner`, `Unit.landlord`, ...). Returning `Ok(None)`
/// means no such resource exists.
#[async_trait]
pub trait OwnershipStore: Send + Sync {
    /// Load the ownership reference for one resource.
    ///
    /// # Errors
    ///
    /// [`StoreError`] for infrastructure failures only; "not found" is
    /// `Ok(None)`.
    async fn load_owner_ref(
        &self,
        subject: SubjectType,
        id: &str,
    ) -> Result<Option<ResourceOwnerRef>, StoreError>;
}

/// The ownership guard. Constructed once with the store port; cheap to
/// clone and share across routes.
#[derive(Clone)]
pub struct OwnershipGuard {
    store: Arc<dyn OwnershipStore>,
}

impl OwnershipGuard {
    #[must_use]
    pub fn new(store: Arc<dyn OwnershipStore>) -> Self {
        Self { store }
    }

    /// Run the ownership check for one request.
    ///
    /// Linear flow:
    /// 1. no ownership declaration on the endpoint → allow (no-op);
    /// 2. resolve the resource id (path param, then body fallback) — failing
    ///    that, deny before any store access;
    /// 3. resolve the caller's landlord context — a principal without one is
    ///    denied;
    /// 4. load the ownership reference;
    /// 5. compare, string-normalized, against the landlord id.
    ///
    /// A missing resource or a missing ownership field denies the same way a
    /// mismatch does: the reason string never discloses whether the resource
    /// exists or whom it belongs to.
    ///
    /// # Errors
    ///
    /// - [`AccessError::MissingResourceId`] when no identifier was supplied
    /// - [`AccessError::Tenancy`] when no landlord context can be derived
    /// - [`AccessError::OwnershipMismatch`] on mismatch or missing resource
    /// - [`AccessError::Store`] when the lookup itself fails
    pub async fn check(
        &self,
        principal: &Principal,
        policy: &EndpointPolicy,
        request: &RequestIdentifiers,
    ) -> Result<(), AccessError> {
        let Some(requirement) = &policy.ownership else {
            return Ok(());
        };

        let resource_id = request
            .resource_id(requirement)
            .ok_or(AccessError::MissingResourceId {
                param: requirement.param_key,
            })?;

        let context = resolve_landlord_context(principal)?;
        let landlord = ScopeValue::from(context.landlord_id());

        let owner_ref = self
            .store
            .load_owner_ref(requirement.subject, &resource_id)
            .await?;

        match owner_ref.and_then(|r| r.owner) {
            Some(owner) if owner.eq_normalized(&landlord) => Ok(()),
            _ => Err(AccessError::OwnershipMismatch),
        }
    }
}

impl std::fmt::Debug for OwnershipGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnershipGuard").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::metadata::OwnershipRequirement;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tenura_security::principal::OrgType;
    use tenura_security::tenancy::TenancyError;
    use uuid::Uuid;

    const USER: &str = "11111111-1111-1111-1111-111111111111";
    const ORG_A: &str = "22222222-2222-2222-2222-222222222222";
    const ORG_B: &str = "33333333-3333-3333-3333-333333333333";

    fn uid(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    /// Mock store answering every lookup with a fixed owner, counting calls.
    struct FixedOwnerStore {
        owner: Option<ScopeValue>,
        calls: AtomicUsize,
    }

    impl FixedOwnerStore {
        fn owned_by(owner: impl Into<ScopeValue>) -> Self {
            Self {
                owner: Some(owner.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn missing() -> Self {
            Self {
                owner: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl OwnershipStore for FixedOwnerStore {
        async fn load_owner_ref(
            &self,
            _subject: SubjectType,
            id: &str,
        ) -> Result<Option<ResourceOwnerRef>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.owner.clone().map(|owner| ResourceOwnerRef {
                id: ScopeValue::from(id),
                owner: Some(owner),
            }))
        }
    }

    /// Mock store that always fails.
    struct FailStore;

    #[async_trait]
    impl OwnershipStore for FailStore {
        async fn load_owner_ref(
            &self,
            _subject: SubjectType,
            _id: &str,
        ) -> Result<Option<ResourceOwnerRef>, StoreError> {
            Err(StoreError::Lookup("boom".to_owned()))
        }
    }

    fn landlord(org: &str) -> Principal {
        Principal::builder(uid(USER))
            .organization(uid(org), OrgType::Landlord)
            .build()
    }

    fn guarded_policy() -> EndpointPolicy {
        EndpointPolicy::none().with_ownership(
            OwnershipRequirement::new(SubjectType::Property, "propertyId")
                .with_body_fallback("property"),
        )
    }

    fn request_with_id() -> RequestIdentifiers {
        RequestIdentifiers::new().path_param("propertyId", "p-1")
    }

    #[tokio::test]
    async fn no_ownership_declaration_is_a_noop() {
        let store = Arc::new(FixedOwnerStore::owned_by(uid(ORG_B)));
        let guard = OwnershipGuard::new(store.clone());

        let result = guard
            .check(&landlord(ORG_A), &EndpointPolicy::none(), &request_with_id())
            .await;

        assert!(result.is_ok());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn matching_owner_allows() {
        let guard = OwnershipGuard::new(Arc::new(FixedOwnerStore::owned_by(uid(ORG_A))));

        let result = guard
            .check(&landlord(ORG_A), &guarded_policy(), &request_with_id())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn mismatched_owner_denies() {
        let guard = OwnershipGuard::new(Arc::new(FixedOwnerStore::owned_by(uid(ORG_B))));

        let result = guard
            .check(&landlord(ORG_A), &guarded_policy(), &request_with_id())
            .await;

        assert!(matches!(result, Err(AccessError::OwnershipMismatch)));
    }

    #[tokio::test]
    async fn string_form_owner_matches_uuid_context() {
        // Store holds the owner as a string; context holds a UUID.
        let guard = OwnershipGuard::new(Arc::new(FixedOwnerStore::owned_by(ORG_A)));

        let result = guard
            .check(&landlord(ORG_A), &guarded_policy(), &request_with_id())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_id_fails_before_any_lookup() {
        let store = Arc::new(FixedOwnerStore::owned_by(uid(ORG_A)));
        let guard = OwnershipGuard::new(store.clone());

        let result = guard
            .check(&landlord(ORG_A), &guarded_policy(), &RequestIdentifiers::new())
            .await;

        assert!(matches!(
            result,
            Err(AccessError::MissingResourceId { param: "propertyId" })
        ));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn body_fallback_reaches_the_store() {
        let store = Arc::new(FixedOwnerStore::owned_by(uid(ORG_A)));
        let guard = OwnershipGuard::new(store.clone());
        let request =
            RequestIdentifiers::new().body(serde_json::json!({ "property": "p-9" }));

        let result = guard.check(&landlord(ORG_A), &guarded_policy(), &request).await;

        assert!(result.is_ok());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_landlord_principal_is_denied() {
        let store = Arc::new(FixedOwnerStore::owned_by(uid(ORG_A)));
        let guard = OwnershipGuard::new(store.clone());
        let tenant_principal = Principal::builder(uid(USER))
            .organization(uid(ORG_A), OrgType::Tenant)
            .build();

        let result = guard
            .check(&tenant_principal, &guarded_policy(), &request_with_id())
            .await;

        assert!(matches!(
            result,
            Err(AccessError::Tenancy(TenancyError::NotLandlord { .. }))
        ));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_resource_denies_like_a_mismatch() {
        let guard = OwnershipGuard::new(Arc::new(FixedOwnerStore::missing()));

        let result = guard
            .check(&landlord(ORG_A), &guarded_policy(), &request_with_id())
            .await;

        assert!(matches!(result, Err(AccessError::OwnershipMismatch)));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_store_error() {
        let guard = OwnershipGuard::new(Arc::new(FailStore));

        let result = guard
            .check(&landlord(ORG_A), &guarded_policy(), &request_with_id())
            .await;

        assert!(matches!(result, Err(AccessError::Store(_))));
    }
}
