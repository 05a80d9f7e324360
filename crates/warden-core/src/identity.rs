// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Resolved caller identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role name that unlocks the administrative endpoints.
///
/// This is a hardcoded check for role/element/rule management only,
/// deliberately separate from the access-rule matrix; it grants nothing
/// on matrix-guarded routes.
pub const ADMIN_ROLE: &str = "admin";

/// The role attached to a resolved identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    /// Role row id.
    pub id: i64,
    /// Role name.
    pub name: String,
}

/// An authenticated caller, produced by the authentication resolver.
///
/// Absence of an `Identity` is the explicit "anonymous" state; there is no
/// sentinel user. The role is resolved at request time so that role changes
/// and deactivation take effect within an access token's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// The user's id.
    pub user_id: Uuid,
    /// The user's email.
    pub email: String,
    /// The user's role, if any. No role means no matrix grants.
    pub role: Option<RoleRef>,
}

impl Identity {
    /// Returns `true` if the identity's role name matches `name`.
    pub fn has_role(&self, name: &str) -> bool {
        self.role.as_ref().is_some_and(|r| r.name == name)
    }

    /// Returns `true` if the identity carries the literal admin role.
    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Option<&str>) -> Identity {
        Identity {
            user_id: Uuid::now_v7(),
            email: "user@example.com".to_string(),
            role: role.map(|name| RoleRef {
                id: 1,
                name: name.to_string(),
            }),
        }
    }

    #[test]
    fn test_admin_is_literal_role_name() {
        assert!(identity(Some("admin")).is_admin());
        assert!(!identity(Some("Administrator")).is_admin());
        assert!(!identity(Some("manager")).is_admin());
        assert!(!identity(None).is_admin());
    }
}
