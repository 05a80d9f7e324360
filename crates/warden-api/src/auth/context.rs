// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use uuid::Uuid;

use warden_core::Identity;

/// Authentication context for a request.
///
/// Attached to every request by the authentication middleware. Anonymous is
/// represented as `identity: None`, not as a sentinel user: handlers that
/// require a caller match on the `Option` and cannot forget the check.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Resolved caller identity, or `None` for anonymous requests.
    pub identity: Option<Identity>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates an anonymous context (for unauthenticated requests).
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Creates an authenticated context.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            request_id: Uuid::now_v7(),
        }
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns `true` if no identity is attached.
    pub fn is_anonymous(&self) -> bool {
        self.identity.is_none()
    }

    /// Returns `true` if the caller carries the admin role.
    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_admin)
    }

    /// Returns the caller's user id, if authenticated.
    pub fn user_id(&self) -> Option<Uuid> {
        self.identity.as_ref().map(|i| i.user_id)
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::RoleRef;

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
    fn test_anonymous_context() {
        let ctx = AuthContext::anonymous();

        assert!(ctx.is_anonymous());
        assert!(!ctx.is_admin());
        assert!(ctx.user_id().is_none());
    }

    #[test]
    fn test_authenticated_context() {
        let id = identity(Some("manager"));
        let user_id = id.user_id;
        let ctx = AuthContext::authenticated(id);

        assert!(!ctx.is_anonymous());
        assert!(!ctx.is_admin());
        assert_eq!(ctx.user_id(), Some(user_id));
    }

    #[test]
    fn test_admin_context() {
        let ctx = AuthContext::authenticated(identity(Some("admin")));
        assert!(ctx.is_admin());
    }
}
