// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Store Integration Tests
//!
//! Tests for the persistence layer against an in-memory database:
//!
//! - Credential verification and its uniform failure
//! - Refresh-session lifecycle and lazy expiry
//! - Role assignment referential checks

use chrono::Utc;
use uuid::Uuid;

use warden_core::User;
use warden_store::{Database, NewUser, StoreError};

async fn test_db() -> Database {
    Database::new(":memory:").await.expect("in-memory database")
}

async fn register(db: &Database, email: &str) -> User {
    db.users()
        .register(NewUser {
            email: email.to_string(),
            password: "a-long-enough-password".to_string(),
            first_name: "Test".to_string(),
            last_name: None,
        })
        .await
        .expect("register")
}

// =============================================================================
// Credentials
// =============================================================================

#[tokio::test]
async fn test_verify_accepts_correct_password_only() {
    let db = test_db().await;
    let user = register(&db, "alice@example.com").await;

    let verified = db
        .users()
        .verify("alice@example.com", "a-long-enough-password")
        .await
        .expect("verify");
    assert_eq!(verified.id, user.id);

    let wrong = db.users().verify("alice@example.com", "wrong").await;
    assert!(matches!(wrong, Err(StoreError::InvalidCredentials)));

    let unknown = db
        .users()
        .verify("nobody@example.com", "a-long-enough-password")
        .await;
    assert!(matches!(unknown, Err(StoreError::InvalidCredentials)));
}

#[tokio::test]
async fn test_email_uniqueness_is_case_insensitive() {
    let db = test_db().await;
    register(&db, "bob@example.com").await;

    let duplicate = db
        .users()
        .register(NewUser {
            email: "BOB@Example.com".to_string(),
            password: "a-long-enough-password".to_string(),
            first_name: "Bob".to_string(),
            last_name: None,
        })
        .await;
    assert!(matches!(duplicate, Err(StoreError::EmailTaken(_))));
}

#[tokio::test]
async fn test_deactivated_user_fails_verification_uniformly() {
    let db = test_db().await;
    let user = register(&db, "carol@example.com").await;

    db.users().deactivate(user.id).await.expect("deactivate");

    let result = db
        .users()
        .verify("carol@example.com", "a-long-enough-password")
        .await;
    assert!(matches!(result, Err(StoreError::InvalidCredentials)));

    assert!(db
        .users()
        .find_active(user.id)
        .await
        .expect("lookup")
        .is_none());
    // The row survives for audit purposes.
    assert!(db
        .users()
        .find_by_id(user.id)
        .await
        .expect("lookup")
        .is_some());
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_session_lifecycle() {
    let db = test_db().await;
    let user = register(&db, "dave@example.com").await;

    let session = db.sessions().issue(user.id).await.expect("issue");
    assert_eq!(session.token.len(), 43);
    assert!(session.is_active);
    assert!(session.expired_at.is_none());

    let now = Utc::now().timestamp();
    let refreshed = db
        .sessions()
        .begin_refresh(&session.token, now)
        .await
        .expect("refresh");
    assert_eq!(refreshed.user_id, user.id);

    let revoked = db.sessions().revoke_all(user.id).await.expect("revoke");
    assert_eq!(revoked, 1);

    let result = db.sessions().begin_refresh(&session.token, now).await;
    assert!(matches!(result, Err(StoreError::InvalidSession)));
}

#[tokio::test]
async fn test_expired_session_is_deactivated_lazily() {
    let db = test_db().await;
    let user = register(&db, "erin@example.com").await;

    let session = db.sessions().issue(user.id).await.expect("issue");
    let now = Utc::now().timestamp();
    let deadline = now - 60;
    db.sessions()
        .set_expiry(&session.token, Some(deadline))
        .await
        .expect("set expiry");

    // First refresh attempt past the deadline flips is_active off.
    let result = db.sessions().begin_refresh(&session.token, now).await;
    assert!(matches!(result, Err(StoreError::InvalidSession)));

    let row = db
        .sessions()
        .find_by_token(&session.token)
        .await
        .expect("lookup")
        .expect("session row");
    assert!(!row.is_active);
    // The recorded deadline is the original one, not the time the expiry
    // was noticed.
    assert_eq!(row.expired_at, Some(deadline));

    // Retrying changes nothing.
    let result = db.sessions().begin_refresh(&session.token, now + 60).await;
    assert!(matches!(result, Err(StoreError::InvalidSession)));
    let row = db
        .sessions()
        .find_by_token(&session.token)
        .await
        .expect("lookup")
        .expect("session row");
    assert_eq!(row.expired_at, Some(deadline));
}

#[tokio::test]
async fn test_session_with_future_expiry_still_refreshes() {
    let db = test_db().await;
    let user = register(&db, "frank@example.com").await;

    let session = db.sessions().issue(user.id).await.expect("issue");
    let now = Utc::now().timestamp();
    db.sessions()
        .set_expiry(&session.token, Some(now + 3600))
        .await
        .expect("set expiry");

    assert!(db
        .sessions()
        .begin_refresh(&session.token, now)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_session_of_deactivated_user_rejected() {
    let db = test_db().await;
    let user = register(&db, "grace@example.com").await;

    let session = db.sessions().issue(user.id).await.expect("issue");
    db.users().deactivate(user.id).await.expect("deactivate");

    let result = db
        .sessions()
        .begin_refresh(&session.token, Utc::now().timestamp())
        .await;
    assert!(matches!(result, Err(StoreError::InvalidSession)));
}

// =============================================================================
// Role Assignment
// =============================================================================

#[tokio::test]
async fn test_role_assignment_checks_references() {
    let db = test_db().await;
    let user = register(&db, "heidi@example.com").await;

    let missing_role = db.users().set_role(user.id, Some(999)).await;
    assert!(matches!(missing_role, Err(StoreError::RoleNotFound(999))));

    let missing_user = db.users().set_role(Uuid::now_v7(), None).await;
    assert!(matches!(missing_user, Err(StoreError::UserNotFound(_))));

    let role = db
        .access()
        .create_role("manager", None)
        .await
        .expect("create role");
    db.users()
        .set_role(user.id, Some(role.id))
        .await
        .expect("assign");

    let reloaded = db
        .users()
        .find_active(user.id)
        .await
        .expect("lookup")
        .expect("user");
    assert_eq!(reloaded.role_id, Some(role.id));

    // Clearing works and is idempotent.
    db.users().set_role(user.id, None).await.expect("clear");
    db.users().set_role(user.id, None).await.expect("clear");
}
