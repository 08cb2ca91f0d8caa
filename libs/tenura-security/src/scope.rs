use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scalar value used in scope filters and rule conditions.
///
/// Identifiers cross this subsystem in two representations: native UUIDs
/// (principals, organization references) and their string form (path
/// parameters, document fields). [`ScopeValue::eq_normalized`] compares
/// across representations so the boundary never depends on which one a
/// caller happens to hold.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeValue {
    /// UUID value (organization IDs, resource IDs).
    Uuid(Uuid),
    /// String value (string-form identifiers, statuses).
    String(String),
    /// Integer value.
    Int(i64),
    /// Boolean value (e.g. soft-delete flags).
    Bool(bool),
}

impl ScopeValue {
    /// Try to extract a UUID from this value.
    ///
    /// Returns `Some` for `ScopeValue::Uuid` directly, and for
    /// `ScopeValue::String` when the string parses as a UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(u) => Some(*u),
            Self::String(s) => Uuid::parse_str(s).ok(),
            Self::Int(_) | Self::Bool(_) => None,
        }
    }

    /// Representation-insensitive equality.
    ///
    /// Two values are equal when they denote the same UUID (regardless of
    /// whether either side carries it as a string) or, failing that, when
    /// their string renderings are equal.
    #[must_use]
    pub fn eq_normalized(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_uuid(), other.as_uuid()) {
            return a == b;
        }
        self == other || self.to_string() == other.to_string()
    }
}

impl fmt::Display for ScopeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<Uuid> for ScopeValue {
    #[inline]
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<&Uuid> for ScopeValue {
    #[inline]
    fn from(u: &Uuid) -> Self {
        Self::Uuid(*u)
    }
}

impl From<String> for ScopeValue {
    #[inline]
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for ScopeValue {
    #[inline]
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<i64> for ScopeValue {
    #[inline]
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for ScopeValue {
    #[inline]
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Well-known authorization property names.
///
/// Shared between rule conditions, the scoping translator, and the
/// persistence layer's field mapping — a single source of truth so a filter
/// on `"owner"` always means the same document field.
pub mod subject_properties {
    /// Resource identity property. Maps to the primary key.
    pub const RESOURCE_ID: &str = "id";

    /// Owning organization of a property record.
    pub const OWNER_ORG_ID: &str = "owner";

    /// Landlord reference on a unit record.
    pub const LANDLORD_ID: &str = "landlord";

    /// Organization membership reference on a user record.
    pub const ORG_ID: &str = "organization_id";
}

/// A single typed predicate on a named resource property.
///
/// Property names are authorization concepts (see [`subject_properties`]);
/// mapping to storage fields is the persistence layer's job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScopeFilter {
    /// Equality: `property = value`.
    Eq {
        property: String,
        value: ScopeValue,
    },
    /// Set membership: `property IN (values)`.
    In {
        property: String,
        values: Vec<ScopeValue>,
    },
}

impl ScopeFilter {
    /// Create an equality filter (`property = value`).
    #[must_use]
    pub fn eq(property: impl Into<String>, value: impl Into<ScopeValue>) -> Self {
        Self::Eq {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Create a set membership filter (`property IN (values)`).
    #[must_use]
    pub fn r#in(property: impl Into<String>, values: Vec<ScopeValue>) -> Self {
        Self::In {
            property: property.into(),
            values,
        }
    }

    /// The authorization property name.
    #[must_use]
    pub fn property(&self) -> &str {
        match self {
            Self::Eq { property, .. } | Self::In { property, .. } => property,
        }
    }

    /// Whether a concrete attribute value satisfies this filter.
    ///
    /// Comparison is representation-insensitive ([`ScopeValue::eq_normalized`]).
    #[must_use]
    pub fn holds_for(&self, actual: &ScopeValue) -> bool {
        match self {
            Self::Eq { value, .. } => value.eq_normalized(actual),
            Self::In { values, .. } => values.iter().any(|v| v.eq_normalized(actual)),
        }
    }
}

/// A conjunction (AND) of scope filters — one access path.
///
/// All filters within a constraint must hold simultaneously for a record to
/// be reachable via this path.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeConstraint {
    filters: Vec<ScopeFilter>,
}

impl ScopeConstraint {
    /// Create a new scope constraint from a list of filters.
    #[must_use]
    pub fn new(filters: Vec<ScopeFilter>) -> Self {
        Self { filters }
    }

    /// Convenience: a single field-equality constraint.
    #[must_use]
    pub fn field_eq(property: impl Into<String>, value: impl Into<ScopeValue>) -> Self {
        Self::new(vec![ScopeFilter::eq(property, value)])
    }

    /// The filters in this constraint (AND-ed together).
    #[must_use]
    pub fn filters(&self) -> &[ScopeFilter] {
        &self.filters
    }

    /// Returns `true` if this constraint has no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// AND an extra filter into this constraint.
    #[must_use]
    pub fn and(mut self, filter: ScopeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Evaluate this constraint against a record's authorization attributes.
    ///
    /// Every filter must find its property among `attrs` and hold for the
    /// attribute value. A missing attribute fails the constraint.
    #[must_use]
    pub fn holds_for(&self, attrs: &[(&str, ScopeValue)]) -> bool {
        self.filters.iter().all(|filter| {
            attrs
                .iter()
                .filter(|(property, _)| *property == filter.property())
                .any(|(_, value)| filter.holds_for(value))
        })
    }
}

/// The composable query predicate produced by the scoping translator.
///
/// Access paths (`constraints`) are OR-ed; a record is accessible when it
/// matches any path and no exclusion. Exclusions carry translated `Deny`
/// conditions and subtract from whatever the paths grant. An unconstrained
/// scope matches everything not excluded; the default scope denies all.
///
/// # Examples
///
/// ```
/// use tenura_security::scope::{AccessScope, ScopeFilter, subject_properties};
/// use uuid::Uuid;
///
/// // deny-all (default)
/// let scope = AccessScope::deny_all();
/// assert!(scope.is_deny_all());
///
/// // everything, narrowed to one organization
/// let org = Uuid::new_v4();
/// let scope = AccessScope::allow_all()
///     .and_filter(ScopeFilter::eq(subject_properties::OWNER_ORG_ID, org));
/// assert!(!scope.is_unconstrained());
/// assert_eq!(scope.constraints().len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessScope {
    constraints: Vec<ScopeConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    exclusions: Vec<ScopeConstraint>,
    #[serde(default)]
    unconstrained: bool,
}

impl AccessScope {
    // ── Constructors ────────────────────────────────────────────────

    /// Create an access scope from a list of access paths (OR-ed).
    #[must_use]
    pub fn from_constraints(constraints: Vec<ScopeConstraint>) -> Self {
        Self {
            constraints,
            exclusions: Vec::new(),
            unconstrained: false,
        }
    }

    /// Create an access scope with a single access path.
    #[must_use]
    pub fn single(constraint: ScopeConstraint) -> Self {
        Self::from_constraints(vec![constraint])
    }

    /// Create an "allow all" (unconstrained) scope.
    ///
    /// A legitimate decision outcome meaning "no row-level filtering", not a
    /// bypass. Exclusions still apply if added afterwards.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            constraints: Vec::new(),
            exclusions: Vec::new(),
            unconstrained: true,
        }
    }

    /// Create a "deny all" scope. Matches nothing; listing through it yields
    /// an empty result set rather than an error.
    #[must_use]
    pub fn deny_all() -> Self {
        Self {
            constraints: Vec::new(),
            exclusions: Vec::new(),
            unconstrained: false,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// The access paths in this scope (OR-ed).
    #[must_use]
    pub fn constraints(&self) -> &[ScopeConstraint] {
        &self.constraints
    }

    /// The exclusion constraints (OR-ed, subtracted from the paths).
    #[must_use]
    pub fn exclusions(&self) -> &[ScopeConstraint] {
        &self.exclusions
    }

    /// Returns `true` if this scope is unconstrained (allow-all).
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.unconstrained
    }

    /// Returns `true` if this scope denies all access.
    #[must_use]
    pub fn is_deny_all(&self) -> bool {
        !self.unconstrained && self.constraints.is_empty()
    }

    // ── Composition ─────────────────────────────────────────────────

    /// AND an extra filter into every access path.
    ///
    /// This is how external filters (tenant boundary, soft-delete exclusion)
    /// are layered onto an ability-derived scope without re-running rule
    /// evaluation. An unconstrained scope becomes a single-path scope holding
    /// just the filter; a deny-all scope stays deny-all.
    #[must_use]
    pub fn and_filter(self, filter: ScopeFilter) -> Self {
        if self.is_deny_all() {
            return self;
        }
        let constraints = if self.unconstrained {
            vec![ScopeConstraint::new(vec![filter])]
        } else {
            self.constraints
                .into_iter()
                .map(|c| c.and(filter.clone()))
                .collect()
        };
        Self {
            constraints,
            exclusions: self.exclusions,
            unconstrained: false,
        }
    }

    /// Add an exclusion constraint (records matching it are never accessible).
    #[must_use]
    pub fn with_exclusion(mut self, exclusion: ScopeConstraint) -> Self {
        self.exclusions.push(exclusion);
        self
    }

    // ── Evaluation ──────────────────────────────────────────────────

    /// Evaluate this scope against a record's authorization attributes.
    ///
    /// Mirrors the predicate the persistence layer would compile from this
    /// scope: excluded records never match; otherwise an unconstrained scope
    /// matches everything and a constrained one requires some access path to
    /// hold.
    #[must_use]
    pub fn matches(&self, attrs: &[(&str, ScopeValue)]) -> bool {
        if self.exclusions.iter().any(|e| e.holds_for(attrs)) {
            return false;
        }
        if self.unconstrained {
            return true;
        }
        self.constraints.iter().any(|c| c.holds_for(attrs))
    }
}
