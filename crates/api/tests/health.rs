//! Smoke test for the root-level health endpoint.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

/// GET /health returns 200 with service status and db reachability.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_endpoint(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
}

/// The health endpoint needs no Authorization header.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_is_public(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get(app, "/health").await;
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}
