// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Simple liveness check. Returns 200 OK if the service is running.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

// =============================================================================
// Readiness Check
// =============================================================================

/// GET /ready
///
/// Readiness check that verifies the database is reachable.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match state.db().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            false
        }
    };

    let response = ReadinessResponse {
        ready: db_healthy,
        components: vec![ComponentStatus {
            name: "database".to_string(),
            healthy: db_healthy,
            message: if db_healthy {
                None
            } else {
                Some("Database unreachable".to_string())
            },
        }],
    };

    if db_healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::config::ApiConfig;

    async fn test_state() -> AppState {
        let config = ApiConfig::default()
            .with_database_path(":memory:")
            .with_jwt(JwtConfig::new("test-secret-key-that-is-long-enough"));

        AppState::builder().config(config).build().await.unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = health().await;
        let body = response.into_response();
        assert_eq!(body.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_endpoint() {
        let state = test_state().await;
        let response = ready(State(state)).await;
        let body = response.into_response();
        assert_eq!(body.status(), StatusCode::OK);
    }
}
