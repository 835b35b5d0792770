//! Request Principal
//!
//! The authenticated identity for one inbound request. Resolved once at the
//! boundary from the session/token, then passed explicitly to every core
//! operation. Immutable after construction and never shared across requests.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Claim type carrying permission grants.
pub const PERMISSION_CLAIM: &str = "permission";

/// A (type, value) assertion attached to a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    pub fn permission(value: impl Into<String>) -> Self {
        Self::new(PERMISSION_CLAIM, value)
    }
}

/// The authenticated identity and its claim set for one request.
///
/// Claims are indexed by type so authorization stays a total, side-effect
/// free lookup. Role-to-permission expansion happens upstream when the
/// claim set is populated; this type only consumes the resulting flat set.
#[derive(Debug, Clone)]
pub struct Principal {
    user_id: Option<i64>,
    user_name: Option<String>,
    ip_address: Option<String>,
    is_authenticated: bool,
    claims: BTreeMap<String, BTreeSet<String>>,
}

impl Principal {
    /// An unauthenticated principal. Callers needing authentication must
    /// check `is_authenticated` rather than assume a user id is present.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            user_name: None,
            ip_address: None,
            is_authenticated: false,
            claims: BTreeMap::new(),
        }
    }

    /// An authenticated principal with no claims yet.
    pub fn authenticated(user_id: i64, user_name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            user_name: Some(user_name.into()),
            ip_address: None,
            is_authenticated: true,
            claims: BTreeMap::new(),
        }
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims
            .entry(claim.claim_type)
            .or_default()
            .insert(claim.value);
        self
    }

    /// Attach a batch of permission claims.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.claims.entry(PERMISSION_CLAIM.to_string()).or_default();
        for permission in permissions {
            entry.insert(permission.into());
        }
        self
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Exact, case-sensitive claim lookup.
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims
            .get(claim_type)
            .is_some_and(|values| values.contains(value))
    }

    /// All claim values of the given type.
    pub fn claims_of(&self, claim_type: &str) -> impl Iterator<Item = &str> {
        self.claims
            .get(claim_type)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    /// All permission claim values.
    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.claims_of(PERMISSION_CLAIM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_no_identity() {
        let principal = Principal::anonymous();
        assert!(!principal.is_authenticated());
        assert!(principal.user_id().is_none());
        assert!(principal.permissions().next().is_none());
    }

    #[test]
    fn test_claim_lookup_is_exact() {
        let principal = Principal::authenticated(7, "ada")
            .with_permissions(["frameworks:create"]);

        assert!(principal.has_claim(PERMISSION_CLAIM, "frameworks:create"));
        assert!(!principal.has_claim(PERMISSION_CLAIM, "Frameworks:Create"));
        assert!(!principal.has_claim("role", "frameworks:create"));
    }

    #[test]
    fn test_claims_indexed_by_type() {
        let principal = Principal::authenticated(7, "ada")
            .with_claim(Claim::new("role", "admin"))
            .with_permissions(["frameworks:create", "frameworks:update"]);

        let permissions: Vec<_> = principal.permissions().collect();
        assert_eq!(permissions, vec!["frameworks:create", "frameworks:update"]);
        assert_eq!(principal.claims_of("role").collect::<Vec<_>>(), vec!["admin"]);
    }

    #[test]
    fn test_duplicate_claims_collapse() {
        let principal = Principal::authenticated(7, "ada")
            .with_permissions(["frameworks:create", "frameworks:create"]);
        assert_eq!(principal.permissions().count(), 1);
    }
}
