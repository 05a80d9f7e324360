// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Administrative handlers: roles, business elements, access rules, and
//! role assignment. All of these require the admin role by name; the
//! access matrix does not apply here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use warden_store::NewAccessRule;

use crate::error::{ApiError, ApiResult, ValidationErrors};
use crate::extractors::AdminUser;
use crate::state::AppState;

// =============================================================================
// Roles
// =============================================================================

/// Role creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateNamedRequest {
    /// Unique name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateNamedRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        errors.into_result(())
    }
}

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> ApiResult<impl IntoResponse> {
    let roles = state.db().access().list_roles().await?;
    Ok(Json(roles))
}

/// POST /api/v1/admin/roles
pub async fn create_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateNamedRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let role = state
        .db()
        .access()
        .create_role(request.name.trim(), request.description.as_deref())
        .await?;

    tracing::info!(admin = %admin.user_id, role = %role.name, "Role created");

    Ok((StatusCode::CREATED, Json(role)))
}

// =============================================================================
// Business Elements
// =============================================================================

/// GET /api/v1/elements
///
/// Lists business elements without any check: elements are the vocabulary
/// of the permission system, not a secret.
pub async fn list_elements(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let elements = state.db().access().list_elements().await?;
    Ok(Json(elements))
}

/// GET /api/v1/admin/elements
pub async fn admin_list_elements(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> ApiResult<impl IntoResponse> {
    let elements = state.db().access().list_elements().await?;
    Ok(Json(elements))
}

/// POST /api/v1/admin/elements
pub async fn create_element(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateNamedRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let element = state
        .db()
        .access()
        .create_element(request.name.trim(), request.description.as_deref())
        .await?;

    tracing::info!(admin = %admin.user_id, element = %element.name, "Business element created");

    Ok((StatusCode::CREATED, Json(element)))
}

// =============================================================================
// Access Rules
// =============================================================================

/// Access rule creation request body. Omitted flags default to deny.
#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    /// Role the rule applies to.
    pub role_id: i64,
    /// Element the rule applies to.
    pub element_id: i64,
    /// Read own records.
    #[serde(default)]
    pub read: bool,
    /// Read any record.
    #[serde(default)]
    pub read_all: bool,
    /// Create records.
    #[serde(default)]
    pub create: bool,
    /// Update own records.
    #[serde(default)]
    pub update: bool,
    /// Update any record.
    #[serde(default)]
    pub update_all: bool,
    /// Delete own records.
    #[serde(default)]
    pub delete: bool,
    /// Delete any record.
    #[serde(default)]
    pub delete_all: bool,
}

/// GET /api/v1/admin/rules
pub async fn list_rules(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> ApiResult<impl IntoResponse> {
    let rules = state.db().access().list_rules().await?;
    Ok(Json(rules))
}

/// POST /api/v1/admin/rules
///
/// Creates the rule for a (role, element) pair. At most one rule may exist
/// per pair; a duplicate is a 409, not a merge.
pub async fn create_rule(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateRuleRequest>,
) -> ApiResult<impl IntoResponse> {
    let access = state.db().access();

    if access.find_role(request.role_id).await?.is_none() {
        return Err(ApiError::not_found("Role"));
    }
    if access.find_element(request.element_id).await?.is_none() {
        return Err(ApiError::not_found("Business element"));
    }

    let rule = access
        .create_rule(
            request.role_id,
            request.element_id,
            NewAccessRule {
                read: request.read,
                read_all: request.read_all,
                create: request.create,
                update: request.update,
                update_all: request.update_all,
                delete: request.delete,
                delete_all: request.delete_all,
            },
        )
        .await?;

    tracing::info!(
        admin = %admin.user_id,
        role_id = rule.role_id,
        element_id = rule.element_id,
        "Access rule created"
    );

    Ok((StatusCode::CREATED, Json(rule)))
}

// =============================================================================
// Role Assignment
// =============================================================================

/// Role assignment request body. `role_id: null` clears the role.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    /// Role to assign, or `null` to clear.
    pub role_id: Option<i64>,
}

/// PUT /api/v1/admin/users/{user_id}/role
pub async fn assign_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AssignRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    state.db().users().set_role(user_id, request.role_id).await?;

    tracing::info!(
        admin = %admin.user_id,
        user_id = %user_id,
        role_id = ?request.role_id,
        "Role assignment updated"
    );

    Ok(Json(crate::response::MessageResponse::ok(
        "Role assignment updated",
    )))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_named_request_validation() {
        let ok = CreateNamedRequest {
            name: "manager".to_string(),
            description: None,
        };
        assert!(ok.validate().is_ok());

        let empty = CreateNamedRequest {
            name: "   ".to_string(),
            description: None,
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_rule_request_flags_default_to_deny() {
        let request: CreateRuleRequest =
            serde_json::from_str(r#"{"role_id": 1, "element_id": 2, "read": true}"#).unwrap();

        assert!(request.read);
        assert!(!request.read_all);
        assert!(!request.create);
        assert!(!request.delete_all);
    }
}
