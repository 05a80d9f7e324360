// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use warden_core::Identity;

use crate::auth::AuthContext;
use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Yields the resolved [`Identity`]. Returns 401 if the request resolved to
/// anonymous.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(caller): Auth) -> impl IntoResponse {
///     format!("Hello, {}", caller.email)
/// }
/// ```
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.identity.clone())
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

// =============================================================================
// Optional Auth Extractor
// =============================================================================

/// Extractor for optionally authenticated requests.
///
/// Yields the [`Identity`] if available, `None` for anonymous requests.
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.identity.clone());
        Ok(OptionalAuth(identity))
    }
}

// =============================================================================
// Admin Extractor
// =============================================================================

/// Extractor for admin-only endpoints.
///
/// The admin role is a literal role-name check, independent of the access
/// matrix. Anonymous callers get 401; authenticated non-admins get 403.
pub struct AdminUser(pub Identity);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.identity.clone())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        if !identity.is_admin() {
            tracing::warn!(user_id = %identity.user_id, "Admin endpoint denied");
            return Err(ApiError::forbidden("Admin role required"));
        }

        Ok(AdminUser(identity))
    }
}

// =============================================================================
// Request ID Extractor
// =============================================================================

/// Extractor for the request ID.
pub struct RequestId(pub uuid::Uuid);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<AuthContext>()
            .map(|ctx| ctx.request_id)
            .unwrap_or_else(uuid::Uuid::now_v7);

        Ok(RequestId(id))
    }
}

// =============================================================================
// Tests
// =============================================================================
