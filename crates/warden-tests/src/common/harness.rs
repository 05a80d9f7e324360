// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory test application and HTTP helpers.
//!
//! [`TestApp`] builds a full [`ApiServer`] on a unique in-memory database,
//! so tests exercise the real router with the real middleware stack. HTTP
//! traffic goes through `tower::ServiceExt::oneshot`; no socket is bound.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use warden_api::{ApiConfig, ApiServer, ApiServerBuilder, JwtConfig};
use warden_core::ADMIN_ROLE;
use warden_store::Database;

/// Signing secret used by every test app.
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Password used for every registered test user.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

// =============================================================================
// TestApp
// =============================================================================

/// A fully wired API server over an in-memory database.
pub struct TestApp {
    /// The server under test.
    pub server: ApiServer,
}

impl TestApp {
    /// Builds a fresh app with its own empty database.
    pub async fn spawn() -> Self {
        let config = ApiConfig::default()
            .with_database_path(":memory:")
            .with_jwt(JwtConfig::new(TEST_JWT_SECRET));

        let server = ApiServerBuilder::new()
            .config(config)
            .build()
            .await
            .expect("failed to build test server");

        Self { server }
    }

    /// The router with the standard routes.
    pub fn router(&self) -> Router {
        self.server.router()
    }

    /// The router with extra routes merged in before the middleware stack.
    pub fn router_with(&self, extra: Router<warden_api::AppState>) -> Router {
        self.server.router_with(extra)
    }

    /// Direct handle to the underlying database.
    pub fn db(&self) -> &Database {
        self.server.state().db()
    }

    /// Registers a user through the API and returns the response body.
    pub async fn register(&self, router: &Router, email: &str) -> Value {
        let request = json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": TEST_PASSWORD,
                "password_repeat": TEST_PASSWORD,
                "first_name": "Test",
            })),
        );
        let response = send(router, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await
    }

    /// Logs a user in through the API and returns the token response body.
    pub async fn login(&self, router: &Router, email: &str) -> Value {
        let request = json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": TEST_PASSWORD })),
        );
        let response = send(router, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }

    /// Registers a user, grants them the admin role directly in the store,
    /// and returns their id and a fresh access token.
    pub async fn register_admin(&self, router: &Router, email: &str) -> (Uuid, String) {
        let user = self.register(router, email).await;
        let user_id = parse_id(&user);

        let role = match self
            .db()
            .access()
            .find_role_by_name(ADMIN_ROLE)
            .await
            .expect("role lookup")
        {
            Some(role) => role,
            None => self
                .db()
                .access()
                .create_role(ADMIN_ROLE, Some("Administrators"))
                .await
                .expect("create admin role"),
        };
        self.db()
            .users()
            .set_role(user_id, Some(role.id))
            .await
            .expect("assign admin role");

        let tokens = self.login(router, email).await;
        (user_id, access_token(&tokens))
    }
}

// =============================================================================
// HTTP Helpers
// =============================================================================

/// Builds a request with an optional bearer token and optional JSON body.
pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Sends a request through the router.
pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.expect("infallible")
}

/// Reads a response body as JSON.
pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Pulls the `id` field out of a user response.
pub fn parse_id(user: &Value) -> Uuid {
    Uuid::parse_str(user["id"].as_str().expect("user id")).expect("uuid")
}

/// Pulls the access token out of a token response.
pub fn access_token(tokens: &Value) -> String {
    tokens["access_token"]
        .as_str()
        .expect("access token")
        .to_string()
}

/// Pulls the refresh token out of a token response.
pub fn refresh_token(tokens: &Value) -> String {
    tokens["refresh_token"]
        .as_str()
        .expect("refresh token")
        .to_string()
}
