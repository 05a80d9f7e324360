// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token signing and validation.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Claims;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Access token lifetime in seconds.
    pub ttl_secs: i64,
    /// Algorithm to use for signing (HMAC family only).
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Whether to validate the issuer.
    pub validate_issuer: bool,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            issuer: "warden".to_string(),
            ttl_secs: 900, // 15 minutes
            algorithm: Algorithm::HS256,
            validate_issuer: true,
            leeway_secs: 60,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the access token lifetime.
    pub fn with_ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::internal("JWT secret is not configured"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ApiError::internal(
                "Only HMAC algorithms are supported for token signing",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TokenSigner
// =============================================================================

/// Signer and validator for access tokens.
///
/// This is the central component for issuing and verifying JWT access
/// tokens. Verification checks signature, expiry, and issuer; it says
/// nothing about the user's current state, which the resolver checks
/// against the store.
#[derive(Clone)]
pub struct TokenSigner {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenSigner {
    /// Creates a new token signer with the given configuration.
    pub fn new(config: JwtConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;
        if config.validate_issuer {
            validation.set_issuer(&[&config.issuer]);
        }

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Issues a new access token for a user.
    pub fn issue(&self, user_id: Uuid) -> ApiResult<String> {
        let claims = Claims::new(user_id, self.config.ttl_secs).with_issuer(&self.config.issuer);
        self.sign(&claims)
    }

    /// Signs the given claims.
    pub fn sign(&self, claims: &Claims) -> ApiResult<String> {
        let header = Header::new(self.config.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to create token: {}", e)))
    }

    /// Validates a token and returns its claims.
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::unauthorized("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    ApiError::unauthorized("Invalid token format")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    ApiError::unauthorized("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    ApiError::unauthorized("Invalid token issuer")
                }
                _ => ApiError::unauthorized(format!("Token validation failed: {}", e)),
            })
    }

    /// Returns the token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.config.ttl_secs
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .field("ttl_secs", &self.config.ttl_secs)
            .finish()
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            _ => return Err(serde::ser::Error::custom("unsupported algorithm")),
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unsupported algorithm: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-key-that-is-long-enough-for-testing")
    }

    #[test]
    fn test_issue_and_verify_token() {
        let signer = TokenSigner::new(test_config()).unwrap();
        let user_id = Uuid::now_v7();

        let token = signer.issue(user_id).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.iss.as_deref(), Some("warden"));
    }

    #[test]
    fn test_expired_token() {
        let signer = TokenSigner::new(test_config().with_ttl_secs(-3600)).unwrap();

        // Lifetime is negative, so the token is born expired. Leeway of 60s
        // would mask a fresh expiry, -3600 does not.
        let token = signer.issue(Uuid::now_v7()).unwrap();
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn test_invalid_token() {
        let signer = TokenSigner::new(test_config()).unwrap();

        assert!(signer.verify("invalid.token.here").is_err());
        assert!(signer.verify("").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let signer1 = TokenSigner::new(JwtConfig::new("secret-one-for-testing-purposes")).unwrap();
        let signer2 = TokenSigner::new(JwtConfig::new("secret-two-for-testing-purposes")).unwrap();

        let token = signer1.issue(Uuid::now_v7()).unwrap();
        assert!(signer2.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let signer1 =
            TokenSigner::new(test_config().with_issuer("someone-else")).unwrap();
        let signer2 = TokenSigner::new(test_config()).unwrap();

        let token = signer1.issue(Uuid::now_v7()).unwrap();
        assert!(signer2.verify(&token).is_err());
    }

    #[test]
    fn test_missing_secret_rejected() {
        assert!(TokenSigner::new(JwtConfig::default()).is_err());
    }
}
