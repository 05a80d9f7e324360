// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::handlers;
use crate::middleware::AuthLayer;
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns the shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        self.router_with(Router::new())
    }

    /// Creates the router, merging `extra` routes before the middleware
    /// stack is applied so they go through authentication too.
    pub fn router_with(&self, extra: Router<AppState>) -> Router {
        let cors = create_cors_layer(&self.config);
        let auth = AuthLayer::new(self.state.tokens.clone(), self.state.db.clone())
            .with_public_paths(self.config.public_paths.clone());

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                axum::http::StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(cors)
            .layer(auth);

        Router::new()
            // Health endpoints (public)
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            // Auth endpoints
            .route("/api/v1/auth/register", post(handlers::register))
            .route("/api/v1/auth/login", post(handlers::login))
            .route("/api/v1/auth/refresh", post(handlers::refresh))
            .route("/api/v1/auth/logout", post(handlers::logout))
            .route(
                "/api/v1/auth/me",
                get(handlers::current_user)
                    .patch(handlers::update_profile)
                    .delete(handlers::deactivate_account),
            )
            // Permission vocabulary
            .route("/api/v1/elements", get(handlers::list_elements))
            // Admin endpoints
            .route(
                "/api/v1/admin/roles",
                get(handlers::list_roles).post(handlers::create_role),
            )
            .route(
                "/api/v1/admin/elements",
                get(handlers::admin_list_elements).post(handlers::create_element),
            )
            .route(
                "/api/v1/admin/rules",
                get(handlers::list_rules).post(handlers::create_rule),
            )
            .route(
                "/api/v1/admin/users/{user_id}/role",
                put(handlers::assign_role),
            )
            // Extra routes join before middleware so auth applies to them
            .merge(extra)
            // Apply middleware and state
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::ApiError::internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| crate::error::ApiError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::ApiError::internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| crate::error::ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;

    let mut layer = CorsLayer::new().max_age(Duration::from_secs(cors.max_age));

    if cors.allowed_origins.contains(&"*".to_string()) {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<_> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    layer = layer.allow_methods(methods);

    if cors.allowed_headers.contains(&"*".to_string()) {
        layer = layer.allow_headers(Any);
    } else {
        layer = layer.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);
    }

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
pub struct ApiServerBuilder {
    state_builder: crate::state::AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self {
            state_builder: AppState::builder(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the database handle.
    pub fn db(mut self, db: warden_store::Database) -> Self {
        self.state_builder = self.state_builder.db(db);
        self
    }

    /// Sets the token signer.
    pub fn tokens(mut self, tokens: Arc<crate::auth::TokenSigner>) -> Self {
        self.state_builder = self.state_builder.tokens(tokens);
        self
    }

    /// Builds the server.
    pub async fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build().await?;
        Ok(ApiServer::new(state))
    }
}

impl Default for ApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;

    fn test_config() -> ApiConfig {
        ApiConfig::default()
            .with_database_path(":memory:")
            .with_jwt(JwtConfig::new("test-secret-key-that-is-long-enough"))
    }

    #[tokio::test]
    async fn test_server_builder() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .await
            .unwrap();

        assert_eq!(server.addr().port(), 8080);
    }

    #[tokio::test]
    async fn test_router_creation() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .await
            .unwrap();

        let _router = server.router();
    }

    #[tokio::test]
    async fn test_cors_layer() {
        let config = test_config();
        let _layer = create_cors_layer(&config);
    }
}
