// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access-rule enforcement middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use warden_core::Action;

use crate::auth::{AccessEngine, AuthContext};
use crate::error::ApiError;

// =============================================================================
// RequireAccessLayer
// =============================================================================

/// Layer that guards a route with an access-rule check.
///
/// Anonymous callers get 401; authenticated callers whose rule does not
/// grant the action get 403. The two are never conflated: 401 means "we do
/// not know who you are", 403 means "we know, and the answer is no".
#[derive(Clone)]
pub struct RequireAccessLayer {
    engine: Arc<AccessEngine>,
    element: Arc<str>,
    action: Action,
}

impl RequireAccessLayer {
    /// Creates a layer requiring `action` on `element`.
    pub fn new(engine: Arc<AccessEngine>, element: impl Into<Arc<str>>, action: Action) -> Self {
        Self {
            engine,
            element: element.into(),
            action,
        }
    }
}

impl<S> Layer<S> for RequireAccessLayer {
    type Service = RequireAccessMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireAccessMiddleware {
            inner,
            engine: self.engine.clone(),
            element: self.element.clone(),
            action: self.action,
        }
    }
}

// =============================================================================
// RequireAccessMiddleware
// =============================================================================

/// Middleware for access-rule enforcement.
#[derive(Clone)]
pub struct RequireAccessMiddleware<S> {
    inner: S,
    engine: Arc<AccessEngine>,
    element: Arc<str>,
    action: Action,
}

impl<S> Service<Request<Body>> for RequireAccessMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let engine = self.engine.clone();
        let element = self.element.clone();
        let action = self.action;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let identity = req
                .extensions()
                .get::<AuthContext>()
                .and_then(|ctx| ctx.identity.clone());

            let identity = match identity {
                Some(identity) => identity,
                None => {
                    tracing::debug!(element = %element, "Anonymous caller denied");
                    return Ok(
                        ApiError::unauthorized("Authentication required").into_response()
                    );
                }
            };

            match engine.authorize(&identity, &element, action).await {
                Ok(true) => inner.call(req).await,
                Ok(false) => {
                    tracing::warn!(
                        user_id = %identity.user_id,
                        element = %element,
                        action = %action,
                        "Access denied"
                    );
                    Ok(ApiError::forbidden("Access denied").into_response())
                }
                Err(e) => Ok(ApiError::from(e).into_response()),
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::ServiceExt;
    use uuid::Uuid;
    use warden_core::{Identity, RoleRef};
    use warden_store::{Database, NewAccessRule};

    fn mock_service() -> impl Service<
        Request<Body>,
        Response = Response,
        Error = Infallible,
        Future = impl Future<Output = Result<Response, Infallible>> + Send + 'static,
    > + Clone
           + Send
           + 'static {
        tower::service_fn(|_req| async { Ok::<_, Infallible>(Response::new(Body::empty())) })
    }

    async fn engine_with_reader_role() -> (Arc<AccessEngine>, RoleRef) {
        let db = Database::new(":memory:").await.unwrap();
        let access = db.access();
        let role = access.create_role("reader", None).await.unwrap();
        let element = access.create_element("orders", None).await.unwrap();
        access
            .create_rule(
                role.id,
                element.id,
                NewAccessRule {
                    read: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let role_ref = RoleRef {
            id: role.id,
            name: role.name,
        };
        (Arc::new(AccessEngine::new(db)), role_ref)
    }

    fn authed_request(role: RoleRef) -> Request<Body> {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(AuthContext::authenticated(Identity {
                user_id: Uuid::now_v7(),
                email: "reader@example.com".to_string(),
                role: Some(role),
            }));
        req
    }

    #[tokio::test]
    async fn test_granted_action_passes() {
        let (engine, role) = engine_with_reader_role().await;
        let layer = RequireAccessLayer::new(engine, "orders", Action::Read);
        let mut service = layer.layer(mock_service());

        let response = service
            .ready()
            .await
            .unwrap()
            .call(authed_request(role))
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_denied_action_is_forbidden() {
        let (engine, role) = engine_with_reader_role().await;
        let layer = RequireAccessLayer::new(engine, "orders", Action::Delete);
        let mut service = layer.layer(mock_service());

        let response = service
            .ready()
            .await
            .unwrap()
            .call(authed_request(role))
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_anonymous_is_unauthorized() {
        let (engine, _) = engine_with_reader_role().await;
        let layer = RequireAccessLayer::new(engine, "orders", Action::Read);
        let mut service = layer.layer(mock_service());

        // Context present but anonymous.
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        req.extensions_mut().insert(AuthContext::anonymous());

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_context_is_unauthorized() {
        let (engine, _) = engine_with_reader_role().await;
        let layer = RequireAccessLayer::new(engine, "orders", Action::Read);
        let mut service = layer.layer(mock_service());

        let req = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
