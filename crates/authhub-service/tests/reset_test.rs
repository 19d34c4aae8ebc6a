//! Integration tests for the password reset key lifecycle.

mod helpers;

use chrono::{Duration, Utc};

use authhub_core::error::ErrorKind;
use authhub_entity::user::User;

async fn stored_user(app: &helpers::TestApp, login_id: &str) -> User {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE login_id = $1")
        .bind(login_id)
        .fetch_one(&app.db_pool)
        .await
        .expect("User should exist")
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_request_reset_stores_key_and_reports_hit() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("resetme", "secret99").await;

    let found = app
        .auth
        .request_password_reset("resetme@example.com")
        .await
        .expect("Reset request should succeed");
    assert!(found);

    let user = stored_user(&app, "resetme").await;
    let key = user.pass_reset_key.expect("Key should be stored");
    assert_eq!(key.len(), 12);
    assert!(user.pass_reset_ts.is_some());
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_request_reset_is_case_insensitive_and_overwrites() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("recase", "secret99").await;

    app.auth
        .request_password_reset("RECASE@Example.COM")
        .await
        .expect("Mixed-case email should match");
    let first = stored_user(&app, "recase").await.pass_reset_key;

    app.auth
        .request_password_reset("recase@example.com")
        .await
        .expect("Second request should succeed");
    let second = stored_user(&app, "recase").await.pass_reset_key;

    assert!(first.is_some());
    assert!(second.is_some());
    assert_ne!(first, second, "A new request replaces the pending key");
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_request_reset_unknown_email_reports_miss() {
    let app = helpers::TestApp::new().await;

    let found = app
        .auth
        .request_password_reset("ghost@example.com")
        .await
        .expect("Request should not error on a miss");
    assert!(!found);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_consume_reset_sets_password_and_clears_key() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("consume", "secret99").await;
    app.auth
        .request_password_reset("consume@example.com")
        .await
        .expect("Reset request should succeed");

    let key = stored_user(&app, "consume")
        .await
        .pass_reset_key
        .expect("Key should be pending");

    app.auth
        .consume_password_reset("consume", &key, "newpass1")
        .await
        .expect("Consume should succeed");

    let user = stored_user(&app, "consume").await;
    assert!(user.pass_reset_key.is_none());
    assert!(user.pass_reset_ts.is_none());
    assert!(!user.reset_required, "A consumed reset must not force another");

    app.auth
        .validate_credentials("consume", "newpass1")
        .await
        .expect("New password should validate");
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_consume_reset_distinguishes_wrong_and_expired_keys() {
    let app = helpers::TestApp::new().await;
    let user_id = app.create_test_user("expiry", "secret99").await;
    app.auth
        .request_password_reset("expiry@example.com")
        .await
        .expect("Reset request should succeed");

    let wrong = app
        .auth
        .consume_password_reset("expiry", "000000000000", "newpass1")
        .await
        .unwrap_err();
    assert_eq!(wrong.kind, ErrorKind::Invalid);

    let stale = Utc::now() - Duration::hours(25);
    sqlx::query("UPDATE users SET pass_reset_ts = $2 WHERE id = $1")
        .bind(user_id)
        .bind(stale)
        .execute(&app.db_pool)
        .await
        .expect("Failed to backdate key");

    let key = stored_user(&app, "expiry")
        .await
        .pass_reset_key
        .expect("Key should be pending");
    let expired = app
        .auth
        .consume_password_reset("expiry", &key, "newpass1")
        .await
        .unwrap_err();
    assert_eq!(expired.kind, ErrorKind::Expired);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_kill_reset_key_invalidates_pending_reset() {
    let app = helpers::TestApp::new().await;
    let user_id = app.create_test_user("killed", "secret99").await;
    app.auth
        .request_password_reset("killed@example.com")
        .await
        .expect("Reset request should succeed");

    let key = stored_user(&app, "killed")
        .await
        .pass_reset_key
        .expect("Key should be pending");

    app.auth
        .kill_reset_key(user_id)
        .await
        .expect("Kill should succeed");

    let err = app
        .auth
        .consume_password_reset("killed", &key, "newpass1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Invalid);
}
