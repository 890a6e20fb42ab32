//! HTTP-level integration tests for signup, login, refresh, and logout.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth, signup};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

/// Successful signup returns 201 with tokens and the user summary.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_success(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "email": "alice@example.com",
        "name": "Alice",
        "password": "a-perfectly-fine-password",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["name"], "Alice");
    // The password hash must never appear in a response.
    assert!(json["user"].get("password_hash").is_none());
}

/// A duplicate email violates the unique constraint and maps to 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_duplicate_email(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    signup(app, "dup@example.com", "First").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "email": "dup@example.com",
        "name": "Second",
        "password": "another-fine-password",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Malformed email and short password are rejected with 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_validation(pool: PgPool) {
    let cases = [
        serde_json::json!({ "email": "not-an-email", "name": "X", "password": "long-enough-pw" }),
        serde_json::json!({ "email": "ok@example.com", "name": "", "password": "long-enough-pw" }),
        serde_json::json!({ "email": "ok@example.com", "name": "X", "password": "short" }),
    ];
    for body in cases {
        let app = common::build_test_app(pool.clone());
        let response = post_json(app, "/api/v1/auth/signup", body.clone()).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "expected 400 for {body}"
        );
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Login with correct credentials returns tokens.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, user_id, _) = signup(app, "bob@example.com", "Bob").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "email": "bob@example.com",
        "password": "test_password_123!",
    });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["user"]["id"], user_id);
}

/// Wrong password and unknown email both return the same 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_bad_credentials(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    signup(app, "carol@example.com", "Carol").await;

    let wrong_password = serde_json::json!({
        "email": "carol@example.com",
        "password": "incorrect",
    });
    let unknown_email = serde_json::json!({
        "email": "ghost@example.com",
        "password": "test_password_123!",
    });

    for body in [wrong_password, unknown_email] {
        let app = common::build_test_app(pool.clone());
        let response = post_json(app, "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

// ---------------------------------------------------------------------------
// Refresh & logout
// ---------------------------------------------------------------------------

/// A valid refresh token returns new tokens, and the old token is rotated
/// out (second use fails).
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotates_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, _, refresh_token) = signup(app, "dave@example.com", "Dave").await;

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let new_refresh = json["refresh_token"].as_str().unwrap();
    assert_ne!(new_refresh, refresh_token, "refresh token must rotate");

    // Replaying the original refresh token must fail.
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes all sessions: the refresh token stops working.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_revokes_sessions(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (access_token, _, refresh_token) = signup(app, "erin@example.com", "Erin").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/auth/logout",
        &access_token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Extractor behaviour
// ---------------------------------------------------------------------------

/// Protected routes reject missing, malformed, and garbage tokens with 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_protected_routes_require_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = common::get(app, "/api/v1/slots").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/slots", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/swaps").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// User calendar status starts disconnected and reflects updates.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_calendar_status(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (token, _, _) = signup(app, "frank@example.com", "Frank").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/user/status", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["calendar_connected"], false);

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "calendar_webhook_url": "https://cal.example.com/hook" });
    let response = common::put_json_auth(app, "/api/v1/user/calendar", &token, body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/user/status", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["calendar_connected"], true);
    assert_eq!(
        json["data"]["calendar_webhook_url"],
        "https://cal.example.com/hook"
    );

    // A non-http URL is refused.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "calendar_webhook_url": "ftp://cal.example.com" });
    let response = common::put_json_auth(app, "/api/v1/user/calendar", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
