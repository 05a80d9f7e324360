// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication middleware.
//!
//! Resolves the Authorization header into an [`AuthContext`] for every
//! request. Credential-shaped failures (missing header, malformed scheme,
//! bad signature, expired token, unknown or deactivated user) all resolve
//! to the anonymous context; only store failures abort the request with a
//! 500. Whether anonymous is acceptable is the route's decision, made
//! downstream by extractors or [`RequireAccessLayer`].
//!
//! [`RequireAccessLayer`]: crate::middleware::RequireAccessLayer

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

use warden_core::{Identity, RoleRef};
use warden_store::{Database, StoreError};

use crate::auth::{AuthContext, TokenSigner};
use crate::error::ApiError;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for token authentication.
///
/// Wraps services so that every request carries an [`AuthContext`] by the
/// time a handler sees it.
#[derive(Clone)]
pub struct AuthLayer {
    tokens: Arc<TokenSigner>,
    db: Database,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(tokens: Arc<TokenSigner>, db: Database) -> Self {
        Self {
            tokens,
            db,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Adds public paths that skip credential resolution entirely.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            tokens: self.tokens.clone(),
            db: self.db.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for token authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    tokens: Arc<TokenSigner>,
    db: Database,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        for public_path in self.public_paths.iter() {
            if let Some(prefix) = public_path.strip_suffix('*') {
                if path.starts_with(prefix) {
                    return true;
                }
            }
        }

        false
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let tokens = self.tokens.clone();
        let db = self.db.clone();
        let is_public = self.is_public_path(req.uri().path());
        // Pulled out here so the future never holds a borrow of the request
        // body across an await (Request<Body> is not Sync).
        let bearer = extract_bearer_token(&req);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let request_id = Uuid::now_v7();

            if is_public {
                req.extensions_mut()
                    .insert(AuthContext::anonymous().with_request_id(request_id));
                return inner.call(req).await;
            }

            let identity = match resolve_identity(&tokens, &db, bearer).await {
                Ok(identity) => identity,
                Err(e) => {
                    // Store failure, not a credential failure. Do not
                    // downgrade to anonymous.
                    return Ok(ApiError::from(e).into_response());
                }
            };

            let auth_ctx = match identity {
                Some(identity) => {
                    AuthContext::authenticated(identity).with_request_id(request_id)
                }
                None => AuthContext::anonymous().with_request_id(request_id),
            };

            req.extensions_mut().insert(auth_ctx);

            inner.call(req).await
        })
    }
}

// =============================================================================
// Identity Resolution
// =============================================================================

/// Resolves an already-extracted bearer token into an identity.
///
/// `Ok(None)` is the anonymous outcome; `Err` is an infrastructure failure.
async fn resolve_identity(
    tokens: &TokenSigner,
    db: &Database,
    bearer: Option<String>,
) -> Result<Option<Identity>, StoreError> {
    let token = match bearer {
        Some(token) => token,
        None => return Ok(None),
    };

    let claims = match tokens.verify(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Token validation failed");
            return Ok(None);
        }
    };

    let user_id = match claims.user_id() {
        Some(id) => id,
        None => {
            tracing::debug!(sub = %claims.sub, "Token subject is not a user id");
            return Ok(None);
        }
    };

    // A valid token for a deactivated or deleted user resolves to anonymous.
    let user = match db.users().find_active(user_id).await? {
        Some(user) => user,
        None => {
            tracing::debug!(user_id = %user_id, "Token subject is not an active user");
            return Ok(None);
        }
    };

    // The role is read at request time so role changes apply immediately. A
    // dangling role_id behaves like no role.
    let role = match user.role_id {
        Some(role_id) => db
            .access()
            .find_role(role_id)
            .await?
            .map(|r| RoleRef { id: r.id, name: r.name }),
        None => None,
    };

    Ok(Some(Identity {
        user_id: user.id,
        email: user.email,
        role,
    }))
}

/// Extracts the bearer token from the Authorization header.
///
/// The header must be exactly two whitespace-separated parts with a
/// case-insensitive `Bearer` scheme. Anything else is treated as absent.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    Some(token.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use std::convert::Infallible;
    use tower::ServiceExt;
    use warden_store::NewUser;

    fn request_with_auth(value: &'static str) -> Request<Body> {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        req
    }

    #[test]
    fn test_extract_bearer_token() {
        let req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(extract_bearer_token(&req).is_none());

        assert_eq!(
            extract_bearer_token(&request_with_auth("Bearer mytoken123")),
            Some("mytoken123".to_string())
        );
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(
            extract_bearer_token(&request_with_auth("bearer abc")),
            Some("abc".to_string())
        );
        assert_eq!(
            extract_bearer_token(&request_with_auth("BEARER abc")),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_malformed_headers_rejected() {
        // Wrong scheme.
        assert!(extract_bearer_token(&request_with_auth("Basic abc")).is_none());
        // Too many parts.
        assert!(extract_bearer_token(&request_with_auth("Bearer abc def")).is_none());
        // Scheme only.
        assert!(extract_bearer_token(&request_with_auth("Bearer")).is_none());
        // Empty value.
        assert!(extract_bearer_token(&request_with_auth("")).is_none());
    }

    /// Runs a real token through the full middleware future, store lookups
    /// and all, and checks the resolved context on the inner service.
    #[tokio::test]
    async fn test_resolves_bearer_identity_end_to_end() {
        let db = Database::new(":memory:").await.unwrap();
        let user = db
            .users()
            .register(NewUser {
                email: "resolver@example.com".to_string(),
                password: "correct-horse-battery".to_string(),
                first_name: "Res".to_string(),
                last_name: None,
            })
            .await
            .unwrap();

        let tokens = Arc::new(
            TokenSigner::new(crate::auth::JwtConfig::new(
                "test-secret-key-that-is-long-enough",
            ))
            .unwrap(),
        );
        let token = tokens.issue(user.id).unwrap();

        let layer = AuthLayer::new(tokens, db);
        let service = layer.layer(tower::service_fn(|req: Request<Body>| async move {
            let authed = req
                .extensions()
                .get::<AuthContext>()
                .is_some_and(|ctx| !ctx.is_anonymous());
            let mut response = Response::new(Body::empty());
            *response.status_mut() = if authed {
                StatusCode::OK
            } else {
                StatusCode::UNAUTHORIZED
            };
            Ok::<_, Infallible>(response)
        }));

        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        req.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let response = service.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Garbage stays anonymous rather than erroring.
        let response = service
            .clone()
            .oneshot(request_with_auth("Bearer not-a-jwt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_paths() {
        let db = Database::new(":memory:").await.unwrap();
        let tokens = Arc::new(
            TokenSigner::new(crate::auth::JwtConfig::new(
                "test-secret-key-that-is-long-enough",
            ))
            .unwrap(),
        );

        let layer = AuthLayer::new(tokens, db)
            .with_public_paths(vec!["/health".to_string(), "/api/v1/auth/*".to_string()]);

        let middleware = layer.layer(tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
        }));

        assert!(middleware.is_public_path("/health"));
        assert!(middleware.is_public_path("/api/v1/auth/login"));
        assert!(!middleware.is_public_path("/api/v1/admin/roles"));
    }
}
