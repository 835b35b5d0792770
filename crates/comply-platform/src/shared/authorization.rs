//! Permission Authorization
//!
//! Claim-based allow/deny decisions. The decision procedure is a pure
//! function of the principal's claim set and the required permission key:
//! exact, case-sensitive matching against `"permission"` claims, no
//! wildcards and no hierarchy.

use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::{Principal, PERMISSION_CLAIM};

/// The capability string a protected operation demands before executing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequirement {
    permission_key: String,
}

impl PermissionRequirement {
    pub fn new(permission_key: impl Into<String>) -> Self {
        Self {
            permission_key: permission_key.into(),
        }
    }

    pub fn permission_key(&self) -> &str {
        &self.permission_key
    }
}

/// Outcome of an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Decide whether the principal satisfies the requirement.
///
/// Allow iff the claim set contains a `"permission"` claim whose value
/// equals the requirement's key exactly. Safe to call concurrently and
/// repeatedly for the same request; no side effects.
pub fn authorize(principal: &Principal, requirement: &PermissionRequirement) -> Decision {
    if principal.has_claim(PERMISSION_CLAIM, requirement.permission_key()) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Gate a mutating operation on a permission key.
///
/// An unauthenticated principal is `Unauthorized` (no valid principal at
/// all); an authenticated principal missing the capability is `Forbidden`.
/// The distinction is preserved end to end because it changes the external
/// status signal.
pub fn require_permission(principal: &Principal, permission_key: &str) -> Result<()> {
    if !principal.is_authenticated() {
        return Err(PlatformError::unauthorized(
            "No authenticated principal for this request",
        ));
    }

    match authorize(principal, &PermissionRequirement::new(permission_key)) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(PlatformError::forbidden(format!(
            "Missing permission: {}",
            permission_key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal_with(permissions: &[&str]) -> Principal {
        Principal::authenticated(1, "test").with_permissions(permissions.iter().copied())
    }

    #[test]
    fn test_allow_on_exact_match() {
        let principal = principal_with(&["frameworks:create"]);
        let requirement = PermissionRequirement::new("frameworks:create");
        assert_eq!(authorize(&principal, &requirement), Decision::Allow);
    }

    #[test]
    fn test_deny_without_claim() {
        let principal = principal_with(&["frameworks:view"]);
        let requirement = PermissionRequirement::new("frameworks:create");
        assert_eq!(authorize(&principal, &requirement), Decision::Deny);
    }

    #[test]
    fn test_deny_on_case_difference() {
        let principal = principal_with(&["Frameworks:Create"]);
        let requirement = PermissionRequirement::new("frameworks:create");
        assert_eq!(authorize(&principal, &requirement), Decision::Deny);
    }

    #[test]
    fn test_no_wildcard_expansion() {
        let principal = principal_with(&["frameworks:*"]);
        let requirement = PermissionRequirement::new("frameworks:create");
        assert_eq!(authorize(&principal, &requirement), Decision::Deny);
    }

    #[test]
    fn test_repeated_calls_agree() {
        let principal = principal_with(&["frameworks:create"]);
        let requirement = PermissionRequirement::new("frameworks:create");
        for _ in 0..3 {
            assert_eq!(authorize(&principal, &requirement), Decision::Allow);
        }
    }

    #[test]
    fn test_require_permission_unauthenticated_is_unauthorized() {
        let err = require_permission(&Principal::anonymous(), "frameworks:create").unwrap_err();
        assert!(matches!(err, PlatformError::Unauthorized { .. }));
    }

    #[test]
    fn test_require_permission_missing_claim_is_forbidden() {
        let principal = principal_with(&[]);
        let err = require_permission(&principal, "frameworks:create").unwrap_err();
        assert!(matches!(err, PlatformError::Forbidden { .. }));
    }

    #[test]
    fn test_require_permission_allows() {
        let principal = principal_with(&["frameworks:create"]);
        assert!(require_permission(&principal, "frameworks:create").is_ok());
    }
}
