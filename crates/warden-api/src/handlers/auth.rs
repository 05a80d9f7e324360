// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers: registration, login, refresh, logout, profile.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;

use warden_store::{NewUser, ProfileUpdate};

use crate::error::{ApiResult, ValidationErrors};
use crate::extractors::Auth;
use crate::response::{AuthResponse, MessageResponse, UserResponse};
use crate::state::AppState;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// Register
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Email address.
    pub email: String,
    /// Password (plaintext in transit, hashed at rest).
    pub password: String,
    /// Confirmation; must match `password`.
    pub password_repeat: String,
    /// Given name.
    pub first_name: String,
    /// Optional family name.
    #[serde(default)]
    pub last_name: Option<String>,
}

/// POST /api/v1/auth/register
///
/// Creates a new user account. New accounts have no role until an admin
/// assigns one.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = ValidationErrors::new();
    if !is_plausible_email(&request.email) {
        errors.add("email", "Invalid email format");
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 8 characters");
    }
    if request.password_repeat != request.password {
        errors.add("password_repeat", "Passwords do not match");
    }
    if request.first_name.trim().is_empty() {
        errors.add("first_name", "First name is required");
    }
    errors.into_result(())?;

    let user = state
        .db()
        .users()
        .register(NewUser {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Loose structural email check. Real validation is the confirmation mail's
/// job; this only catches obvious garbage.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// Verifies credentials, opens a refresh session, and returns both tokens.
/// All credential failures come back as the same 401, empty fields
/// included; a distinct validation error would leak which part was wrong.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .db()
        .users()
        .verify(&request.email, &request.password)
        .await?;

    let access_token = state.tokens().issue(user.id)?;
    let session = state.db().sessions().issue(user.id).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(
        AuthResponse::new(access_token, state.tokens().ttl_secs())
            .with_refresh_token(session.token),
    ))
}

// =============================================================================
// Refresh
// =============================================================================

/// Refresh request body.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Opaque refresh token from login.
    pub refresh_token: String,
}

/// POST /api/v1/auth/refresh
///
/// Exchanges a live refresh token for a fresh access token. The refresh
/// token itself is never rotated; the client keeps presenting the same one
/// until logout or expiry.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let now = Utc::now().timestamp();
    let session = state
        .db()
        .sessions()
        .begin_refresh(&request.refresh_token, now)
        .await?;

    let access_token = state.tokens().issue(session.user_id)?;

    tracing::debug!(user_id = %session.user_id, "Access token refreshed");

    Ok(Json(AuthResponse::new(
        access_token,
        state.tokens().ttl_secs(),
    )))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/v1/auth/logout
///
/// Revokes every active session of the caller. Their outstanding access
/// tokens keep working until they expire; refresh stops immediately.
pub async fn logout(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<impl IntoResponse> {
    let revoked = state.db().sessions().revoke_all(caller.user_id).await?;

    tracing::info!(user_id = %caller.user_id, revoked, "User logged out");

    Ok(Json(MessageResponse::ok("Logged out successfully")))
}

// =============================================================================
// Profile
// =============================================================================

/// GET /api/v1/auth/me
///
/// Returns the caller's profile.
pub async fn current_user(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .db()
        .users()
        .find_active(caller.user_id)
        .await?
        .ok_or_else(|| crate::error::ApiError::unauthorized("User no longer active"))?;

    Ok(Json(UserResponse::from(&user)))
}

/// Profile update request body; omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New email.
    #[serde(default)]
    pub email: Option<String>,
    /// New given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// New family name.
    #[serde(default)]
    pub last_name: Option<String>,
}

/// PATCH /api/v1/auth/me
///
/// Applies a partial profile update and returns the new profile.
pub async fn update_profile(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = ValidationErrors::new();
    if let Some(ref email) = request.email {
        if !is_plausible_email(email) {
            errors.add("email", "Invalid email format");
        }
    }
    if let Some(ref first_name) = request.first_name {
        if first_name.trim().is_empty() {
            errors.add("first_name", "First name cannot be empty");
        }
    }
    errors.into_result(())?;

    let user = state
        .db()
        .users()
        .update_profile(
            caller.user_id,
            ProfileUpdate {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/auth/me
///
/// Soft-deletes the caller's account and revokes all sessions. The account
/// row survives for audit purposes but stops authenticating everywhere.
pub async fn deactivate_account(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<impl IntoResponse> {
    state.db().users().deactivate(caller.user_id).await?;
    state.db().sessions().revoke_all(caller.user_id).await?;

    tracing::info!(user_id = %caller.user_id, "Account deactivated");

    Ok(Json(MessageResponse::ok("Account deactivated")))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("user@example.com"));
        assert!(is_plausible_email("a.b+c@sub.example.org"));

        assert!(!is_plausible_email(""));
        assert!(!is_plausible_email("no-at-sign"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("user@nodot"));
        assert!(!is_plausible_email("user@.com"));
    }
}
