// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-store
//!
//! Async SQLite persistence for the Warden access-control service:
//!
//! - [`UserRepository`]: credential store (registration, verification,
//!   soft deletion)
//! - [`SessionRepository`]: refresh-token sessions
//! - [`AccessRepository`]: roles, business elements, and access rules
//!
//! The pool is the only shared state; every mutation is a single statement
//! or a conditional update, so concurrent request handlers never observe a
//! torn write.

#![deny(unsafe_code)]

mod access;
mod sessions;
mod users;

pub use access::{AccessRepository, NewAccessRule};
pub use sessions::SessionRepository;
pub use users::{NewUser, ProfileUpdate, UserRepository};

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure. Infrastructure, never downgraded.
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
    /// Migration failure at startup.
    #[error("migration error: {0}")]
    Migration(sqlx::migrate::MigrateError),
    /// Email already registered (case-insensitive).
    #[error("email already in use: {0}")]
    EmailTaken(String),
    /// Uniform credential failure: unknown email, inactive account, and
    /// wrong password are deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Refresh token unknown, inactive, expired, or owned by an inactive
    /// user. Uniform on purpose.
    #[error("invalid session")]
    InvalidSession,
    /// Role name already exists.
    #[error("role already exists: {0}")]
    RoleExists(String),
    /// Element name already exists.
    #[error("business element already exists: {0}")]
    ElementExists(String),
    /// A rule for this (role, element) pair already exists.
    #[error("access rule already exists for role {role_id} and element {element_id}")]
    RuleExists {
        /// Role half of the pair.
        role_id: i64,
        /// Element half of the pair.
        element_id: i64,
    },
    /// Referenced role does not exist.
    #[error("role not found: {0}")]
    RoleNotFound(i64),
    /// Referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    /// Corrupt or unexpected row contents.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Sqlx(err)
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migration(err)
    }
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout - prevents connection storms from blocking indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a new database connection, running migrations if needed.
    ///
    /// `":memory:"` opens a uniquely named shared-cache in-memory database
    /// so parallel tests do not collide.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let pool = if path == ":memory:" {
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:warden-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true)
                // Per-connection pragma; the options apply it on every
                // connection the pool opens.
                .foreign_keys(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
                    }
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                // Foreign keys are required for the ON DELETE behavior in
                // the schema; the pragma is per-connection, so it has to be
                // part of the connect options, not a one-off query.
                .foreign_keys(true)
                // WAL mode allows reads while a write is in progress.
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Get reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap connectivity check for readiness probes.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Run embedded migrations.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(pool).await?;

        info!("Database migrations checked/applied");
        Ok(())
    }

    /// Get user repository.
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    /// Get session repository.
    pub fn sessions(&self) -> SessionRepository<'_> {
        SessionRepository::new(&self.pool)
    }

    /// Get access-matrix repository.
    pub fn access(&self) -> AccessRepository<'_> {
        AccessRepository::new(&self.pool)
    }
}

/// Parse a stored user id column.
pub(crate) fn parse_user_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Internal(format!("bad user id {raw:?}: {e}")))
}

/// Current time as Unix seconds.
pub(crate) fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_foreign_keys_enforced_on_file_backed_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.db");
        let db = Database::new(path.to_str().unwrap()).await.unwrap();

        // The pragma is per-connection; repeated inserts give the pool room
        // to hand out more than the first connection.
        for i in 0..8 {
            let result = sqlx::query(
                "INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, 0)",
            )
            .bind(format!("token-{i}"))
            .bind("no-such-user")
            .execute(db.pool())
            .await;
            assert!(result.is_err(), "dangling session insert must be rejected");
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let db = Database::new(":memory:").await.unwrap();
        db.ping().await.unwrap();
    }
}
