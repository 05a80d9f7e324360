// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential store: user registration, verification, and soft deletion.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use warden_core::User;

use crate::{now_ts, parse_user_id, StoreError};

type UserRow = (
    String,
    String,
    String,
    String,
    String,
    bool,
    Option<i64>,
    i64,
    i64,
);

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, is_active, role_id, created_at, updated_at";

/// A registration request. The plaintext password is consumed by hashing
/// and never stored.
#[derive(Debug)]
pub struct NewUser {
    /// Unique email.
    pub email: String,
    /// Plaintext password, hashed before persistence.
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Optional family name.
    pub last_name: Option<String>,
}

/// A partial profile update; `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    /// New email, if changing.
    pub email: Option<String>,
    /// New given name, if changing.
    pub first_name: Option<String>,
    /// New family name, if changing.
    pub last_name: Option<String>,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new user with a salted argon2 password hash.
    ///
    /// The email unique index (case-insensitive) converts duplicates into
    /// [`StoreError::EmailTaken`].
    pub async fn register(&self, new: NewUser) -> Result<User, StoreError> {
        let password_hash = hash_password(&new.password)?;
        let id = Uuid::now_v7();
        let now = now_ts();
        let last_name = new.last_name.unwrap_or_default();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, password_hash, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&last_name)
        .bind(&password_hash)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return StoreError::EmailTaken(new.email.clone());
                }
            }
            StoreError::from(e)
        })?;

        Ok(User {
            id,
            email: new.email,
            first_name: new.first_name,
            last_name,
            password_hash,
            is_active: true,
            role_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Verify credentials and return the user if valid.
    ///
    /// Unknown email, inactive account, and wrong password all fail with the
    /// same [`StoreError::InvalidCredentials`]. When no matching active user
    /// exists, a dummy hash verification is performed so the response time
    /// does not reveal whether the account exists.
    pub async fn verify(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let user = match row {
            Some(row) => row_to_user(row)?,
            None => {
                dummy_password_verify(password);
                return Err(StoreError::InvalidCredentials);
            }
        };

        if !user.is_active {
            dummy_password_verify(password);
            return Err(StoreError::InvalidCredentials);
        }

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    /// Find a user by id, but only if still active.
    ///
    /// This is the resolver's lookup: a structurally valid access token for
    /// a deactivated user must resolve to nothing.
    pub async fn find_active(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND is_active = 1"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(row_to_user).transpose()
    }

    /// Find a user by id regardless of active state (admin surface).
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(row_to_user).transpose()
    }

    /// Apply a partial profile update and return the new row.
    pub async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileUpdate,
    ) -> Result<User, StoreError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or(StoreError::UserNotFound(id))?;

        let email = changes.email.unwrap_or(current.email);
        let first_name = changes.first_name.unwrap_or(current.first_name);
        let last_name = changes.last_name.unwrap_or(current.last_name);
        let now = now_ts();

        sqlx::query(
            "UPDATE users SET email = ?, first_name = ?, last_name = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&email)
        .bind(&first_name)
        .bind(&last_name)
        .bind(now)
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return StoreError::EmailTaken(email.clone());
                }
            }
            StoreError::from(e)
        })?;

        Ok(User {
            email,
            first_name,
            last_name,
            updated_at: now,
            ..current
        })
    }

    /// Assign (or clear) a user's role.
    pub async fn set_role(&self, id: Uuid, role_id: Option<i64>) -> Result<(), StoreError> {
        if let Some(role_id) = role_id {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM roles WHERE id = ?")
                .bind(role_id)
                .fetch_optional(self.pool)
                .await?;
            if exists.is_none() {
                return Err(StoreError::RoleNotFound(role_id));
            }
        }

        let result = sqlx::query("UPDATE users SET role_id = ?, updated_at = ? WHERE id = ?")
            .bind(role_id)
            .bind(now_ts())
            .bind(id.to_string())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound(id));
        }
        Ok(())
    }

    /// Soft-delete a user. The row survives; login, refresh, and token
    /// resolution all start failing. Idempotent.
    pub async fn deactivate(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(now_ts())
            .bind(id.to_string())
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_user(row: UserRow) -> Result<User, StoreError> {
    let (id, email, first_name, last_name, password_hash, is_active, role_id, created_at, updated_at) =
        row;
    Ok(User {
        id: parse_user_id(&id)?,
        email,
        first_name,
        last_name,
        password_hash,
        is_active,
        role_id,
        created_at,
        updated_at,
    })
}

/// Hash a password using argon2.
fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), StoreError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| StoreError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| StoreError::InvalidCredentials)
}

/// Dummy password verification for constant-time account lookup.
///
/// When no matching active user exists we still burn CPU time comparable to
/// a real argon2 verification, so timing does not reveal account existence.
fn dummy_password_verify(password: &str) {
    const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nLW9yYWNsZS1kdW1teQ$K4VZh8k8YL3E8H7E8H7E8H7E8H7E8H7E8H7E8H7E8Hs";

    if let Ok(parsed) = PasswordHash::new(DUMMY_HASH) {
        let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("Secr3t!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Secr3t!", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(StoreError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }
}
