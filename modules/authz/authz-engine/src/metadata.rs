//! Declarative per-endpoint policy metadata.
//!
//! Each endpoint attaches an [`EndpointPolicy`] at route-registration time;
//! the pre-handler check and the ownership guard read it from there. Both
//! declarations are optional and independent — an endpoint with neither gets
//! neither check. The metadata is a plain value looked up by route identity,
//! not discovered by runtime introspection.

use std::collections::HashMap;

use crate::rules::{Action, SubjectType};

/// The action/subject pair an endpoint requires, checked by the decision
/// point before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredPermission {
    pub action: Action,
    pub subject: SubjectType,
}

/// Declares that an endpoint wants the instance-level ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipRequirement {
    /// The subject kind whose ownership reference is loaded.
    pub subject: SubjectType,
    /// Path parameter carrying the resource id.
    pub param_key: &'static str,
    /// Body field to fall back to when the path parameter is absent
    /// (the primary relation field, e.g. `"property"` on unit creation).
    pub body_fallback_field: Option<&'static str>,
}

impl OwnershipRequirement {
    #[must_use]
    pub fn new(subject: SubjectType, param_key: &'static str) -> Self {
        Self {
            subject,
            param_key,
            body_fallback_field: None,
        }
    }

    #[must_use]
    pub fn with_body_fallback(mut self, field: &'static str) -> Self {
        self.body_fallback_field = Some(field);
        self
    }
}

/// Everything an endpoint declares about its authorization requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointPolicy {
    pub required: Option<RequiredPermission>,
    pub ownership: Option<OwnershipRequirement>,
}

impl EndpointPolicy {
    /// A policy with no checks (public or handled elsewhere).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn require(action: Action, subject: SubjectType) -> Self {
        Self {
            required: Some(RequiredPermission { action, subject }),
            ownership: None,
        }
    }

    #[must_use]
    pub fn with_ownership(mut self, ownership: OwnershipRequirement) -> Self {
        self.ownership = Some(ownership);
        self
    }
}

/// The parts of the inbound request the guard may inspect: resolved path
/// parameters and the parsed JSON body, when one exists.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentifiers {
    path_params: HashMap<String, String>,
    body: Option<serde_json::Value>,
}

impl RequestIdentifiers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Resolve the candidate resource id for an ownership requirement:
    /// the named path parameter first, then the body fallback field.
    #[must_use]
    pub fn resource_id(&self, requirement: &OwnershipRequirement) -> Option<String> {
        if let Some(id) = self.path_params.get(requirement.param_key) {
            return Some(id.clone());
        }
        let field = requirement.body_fallback_field?;
        self.body
            .as_ref()
            .and_then(|body| body.get(field))
            .and_then(|value| value.as_str())
            .map(ToOwned::to_owned)
    }
}
