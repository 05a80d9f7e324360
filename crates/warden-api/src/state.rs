// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use warden_store::Database;

use crate::auth::{AccessEngine, TokenSigner};
use crate::config::ApiConfig;
use crate::error::ApiResult;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// This is the central state container that is passed to all handlers via
/// Axum's state extraction mechanism.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Database handle.
    pub db: Database,
    /// Token signer for access tokens.
    pub tokens: Arc<TokenSigner>,
    /// Authorization engine.
    pub engine: Arc<AccessEngine>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Returns the token signer.
    pub fn tokens(&self) -> &TokenSigner {
        &self.tokens
    }

    /// Returns the authorization engine.
    pub fn engine(&self) -> &Arc<AccessEngine> {
        &self.engine
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    db: Option<Database>,
    tokens: Option<Arc<TokenSigner>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            db: None,
            tokens: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the database handle.
    pub fn db(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    /// Sets the token signer.
    pub fn tokens(mut self, tokens: Arc<TokenSigner>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Builds the AppState, connecting the database if one was not supplied.
    pub async fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let db = match self.db {
            Some(db) => db,
            None => Database::new(&config.database_path).await?,
        };

        let tokens = match self.tokens {
            Some(tokens) => tokens,
            None => Arc::new(TokenSigner::new(config.jwt.clone())?),
        };

        let engine = Arc::new(AccessEngine::new(db.clone()));

        Ok(AppState {
            config: Arc::new(config),
            db,
            tokens,
            engine,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<TokenSigner> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<AccessEngine> {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
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
    async fn test_app_state_builder() {
        let state = AppState::builder().config(test_config()).build().await.unwrap();

        assert_eq!(state.tokens().ttl_secs(), 900);
    }

    #[tokio::test]
    async fn test_missing_secret_fails() {
        let config = ApiConfig::default().with_database_path(":memory:");
        let result = AppState::builder().config(config).build().await;

        assert!(result.is_err());
    }
}
