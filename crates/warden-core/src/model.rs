// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Persisted entities.
//!
//! Timestamps are Unix seconds (UTC). Users are identified by UUID v7;
//! roles, elements, rules and sessions use rowids.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Action;

// =============================================================================
// User
// =============================================================================

/// A registered user.
///
/// `is_active = false` is a soft delete: the row survives, but the user is
/// treated as unauthenticated for login, refresh, and token resolution.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Opaque unique id.
    pub id: Uuid,
    /// Unique email; lookups compare case-insensitively.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name (may be empty).
    pub last_name: String,
    /// Salted argon2 hash in PHC string format. Never logged or serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Soft-delete flag.
    pub is_active: bool,
    /// At most one role; absence means no grants.
    pub role_id: Option<i64>,
    /// Creation time (Unix seconds).
    pub created_at: i64,
    /// Last mutation time (Unix seconds).
    pub updated_at: i64,
}

// =============================================================================
// Role / BusinessElement
// =============================================================================

/// A named group conferring permission grants via access rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Row id.
    pub id: i64,
    /// Unique, human-readable name. The literal `"admin"` unlocks the
    /// administrative endpoints.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// A protected resource type (e.g. "orders").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessElement {
    /// Row id.
    pub id: i64,
    /// Unique name, matched exactly by the authorization engine.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

// =============================================================================
// AccessRule
// =============================================================================

/// The permission-grant row for one (role, element) pair.
///
/// At most one rule exists per pair (enforced by a unique index). Each of
/// the seven flags is independently authoritative; granting `read_all` does
/// not imply `read` and vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRule {
    /// Row id.
    pub id: i64,
    /// Owning role.
    pub role_id: i64,
    /// Protected element.
    pub element_id: i64,
    /// Read own resources.
    pub read: bool,
    /// Read all resources.
    pub read_all: bool,
    /// Create resources.
    pub create: bool,
    /// Update own resources.
    pub update: bool,
    /// Update all resources.
    pub update_all: bool,
    /// Delete own resources.
    pub delete: bool,
    /// Delete all resources.
    pub delete_all: bool,
}

impl AccessRule {
    /// Returns the boolean grant for one action tag.
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Read => self.read,
            Action::ReadAll => self.read_all,
            Action::Create => self.create,
            Action::Update => self.update,
            Action::UpdateAll => self.update_all,
            Action::Delete => self.delete,
            Action::DeleteAll => self.delete_all,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// A refresh-token session.
///
/// The token is opaque; all trust state lives in this row. Access tokens are
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Row id.
    pub id: i64,
    /// Opaque, unguessable, URL-safe token (unique).
    pub token: String,
    /// Owning user.
    pub user_id: Uuid,
    /// Creation time (Unix seconds).
    pub created_at: i64,
    /// Optional expiry (Unix seconds); `None` means no expiry recorded.
    pub expired_at: Option<i64>,
    /// An inactive session never yields a new access token, regardless of
    /// `expired_at`.
    pub is_active: bool,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_with(action: Action) -> AccessRule {
        let mut rule = AccessRule {
            id: 1,
            role_id: 1,
            element_id: 1,
            read: false,
            read_all: false,
            create: false,
            update: false,
            update_all: false,
            delete: false,
            delete_all: false,
        };
        match action {
            Action::Read => rule.read = true,
            Action::ReadAll => rule.read_all = true,
            Action::Create => rule.create = true,
            Action::Update => rule.update = true,
            Action::UpdateAll => rule.update_all = true,
            Action::Delete => rule.delete = true,
            Action::DeleteAll => rule.delete_all = true,
        }
        rule
    }

    #[test]
    fn test_rule_flags_are_independent() {
        for granted in Action::all() {
            let rule = rule_with(*granted);
            for action in Action::all() {
                assert_eq!(rule.allows(*action), action == granted);
            }
        }
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::now_v7(),
            email: "a@example.com".to_string(),
            first_name: "A".to_string(),
            last_name: String::new(),
            password_hash: "$argon2id$secret".to_string(),
            is_active: true,
            role_id: None,
            created_at: 0,
            updated_at: 0,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }
}
