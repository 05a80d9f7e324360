// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
///
/// The token carries only the subject and timing. Roles are deliberately not
/// embedded: the caller's role and active state are resolved from the store
/// on every request, so deactivation and role changes take effect within a
/// token's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user ID.
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Not before time (Unix timestamp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// JWT ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Creates new claims for a user.
    pub fn new(user_id: Uuid, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: user_id.to_string(),
            exp: now + expires_in_secs,
            iat: now,
            nbf: Some(now),
            iss: None,
            jti: Some(Uuid::now_v7().to_string()),
        }
    }

    /// Parses the subject as a user id.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let id = Uuid::now_v7();
        let claims = Claims::new(id, 3600);

        assert_eq!(claims.user_id(), Some(id));
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_malformed_subject() {
        let mut claims = Claims::new(Uuid::now_v7(), 3600);
        claims.sub = "not-a-uuid".to_string();

        assert!(claims.user_id().is_none());
    }

    #[test]
    fn test_expired_claims() {
        let expired = Claims {
            exp: Utc::now().timestamp() - 100,
            ..Claims::new(Uuid::now_v7(), 0)
        };

        assert!(expired.is_expired());
    }
}
