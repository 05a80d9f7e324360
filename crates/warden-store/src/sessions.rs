// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Refresh-token sessions.
//!
//! A session is an opaque server-side record keyed by a high-entropy token.
//! Tokens are never rotated: a refresh returns new access credentials but
//! leaves the session row and its token untouched. Expiry is lazy; a session
//! past its deadline is deactivated the first time someone presents it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sqlx::SqlitePool;
use uuid::Uuid;

use warden_core::Session;

use crate::{now_ts, parse_user_id, StoreError};

/// Refresh-token entropy in bytes, before base64 encoding.
const TOKEN_BYTES: usize = 32;

type SessionRow = (i64, String, String, i64, Option<i64>, bool);

const SESSION_COLUMNS: &str = "id, token, user_id, created_at, expired_at, is_active";

/// Repository for refresh-token sessions.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a new session for a user and return it.
    ///
    /// Sessions are created without an expiry deadline; callers that want a
    /// bounded lifetime set one explicitly via [`set_expiry`].
    ///
    /// [`set_expiry`]: SessionRepository::set_expiry
    pub async fn issue(&self, user_id: Uuid) -> Result<Session, StoreError> {
        let token = generate_token();
        let now = now_ts();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sessions (token, user_id, created_at, is_active)
            VALUES (?, ?, ?, 1)
            RETURNING id
            "#,
        )
        .bind(&token)
        .bind(user_id.to_string())
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(Session {
            id,
            token,
            user_id,
            created_at: now,
            expired_at: None,
            is_active: true,
        })
    }

    /// Validate a presented refresh token and return its session.
    ///
    /// Fails uniformly with [`StoreError::InvalidSession`] when the token is
    /// unknown, the session is inactive, its owner is inactive, or the
    /// expiry deadline has passed. A session found past its deadline is
    /// deactivated here, by a single conditional update so that concurrent
    /// presentations of the same token flip it exactly once. The deadline
    /// itself is left untouched.
    pub async fn begin_refresh(&self, token: &str, now: i64) -> Result<Session, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT s.id, s.token, s.user_id, s.created_at, s.expired_at, s.is_active
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = ? AND s.is_active = 1 AND u.is_active = 1
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        let session = match row {
            Some(row) => row_to_session(row)?,
            None => return Err(StoreError::InvalidSession),
        };

        if let Some(deadline) = session.expired_at {
            if deadline <= now {
                sqlx::query("UPDATE sessions SET is_active = 0 WHERE id = ? AND is_active = 1")
                    .bind(session.id)
                    .execute(self.pool)
                    .await?;
                return Err(StoreError::InvalidSession);
            }
        }

        Ok(session)
    }

    /// Deactivate every active session belonging to a user (logout).
    ///
    /// Returns the number of sessions revoked. Idempotent.
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let result =
            sqlx::query("UPDATE sessions SET is_active = 0 WHERE user_id = ? AND is_active = 1")
                .bind(user_id.to_string())
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Look up a session by token regardless of state.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE token = ?"
        ))
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.map(row_to_session).transpose()
    }

    /// Set (or clear) a session's expiry deadline.
    pub async fn set_expiry(&self, token: &str, at: Option<i64>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE sessions SET expired_at = ? WHERE token = ?")
            .bind(at)
            .bind(token)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::InvalidSession);
        }
        Ok(())
    }
}

fn row_to_session(row: SessionRow) -> Result<Session, StoreError> {
    let (id, token, user_id, created_at, expired_at, is_active) = row;
    Ok(Session {
        id,
        token,
        user_id: parse_user_id(&user_id)?,
        created_at,
        expired_at,
        is_active,
    })
}

/// Generate an opaque refresh token: 32 bytes of OS entropy, url-safe
/// base64 without padding.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// =============================================================================
// Tests
// =============================================================================
