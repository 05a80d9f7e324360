// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_core::User;

// =============================================================================
// Auth Responses
// =============================================================================

/// Authentication response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Opaque refresh token (only on login).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl AuthResponse {
    /// Creates a new auth response.
    pub fn new(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            refresh_token: None,
        }
    }

    /// Adds a refresh token.
    pub fn with_refresh_token(mut self, refresh_token: String) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }
}

/// Public view of a user.
///
/// The password hash never appears here; this is the only user shape the
/// API returns.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// User id.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Assigned role id, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
    /// Creation time (Unix seconds).
    pub created_at: i64,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
            role_id: user.role_id,
            created_at: user.created_at,
        }
    }
}

// =============================================================================
// Generic Responses
// =============================================================================

/// Simple acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Whether the operation was successful.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a success acknowledgement.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// =============================================================================
// Health Responses
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Readiness check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready.
    pub ready: bool,
    /// Component statuses.
    pub components: Vec<ComponentStatus>,
}

/// Status of a system component.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response() {
        let response = AuthResponse::new("token".to_string(), 900);
        assert_eq!(response.token_type, "Bearer");
        assert!(response.refresh_token.is_none());

        let with_refresh = response.with_refresh_token("refresh".to_string());
        assert_eq!(with_refresh.refresh_token.as_deref(), Some("refresh"));
    }

    #[test]
    fn test_user_response_has_no_hash() {
        let user = User {
            id: Uuid::now_v7(),
            email: "a@b.com".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            is_active: true,
            role_id: None,
            created_at: 0,
            updated_at: 0,
        };

        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
