//! Route definitions, one module per resource.

pub mod auth;
pub mod health;
pub mod slots;
pub mod swaps;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                 create account (public)
/// /auth/login                  login (public)
/// /auth/refresh                rotate refresh token (public)
/// /auth/logout                 revoke sessions (requires auth)
///
/// /user/status                 calendar connection probe
/// /user/calendar               set/clear calendar webhook (PUT)
///
/// /slots                       list own (GET), create (POST)
/// /slots/available             browse other users' swappable slots
/// /slots/import                bulk upsert of external calendar events
/// /slots/{id}                  update (PUT), delete
///
/// /swaps                       list own requests (GET), propose (POST)
/// /swaps/{id}/respond          accept or reject (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/user", user::router())
        .nest("/slots", slots::router())
        .nest("/swaps", swaps::router())
}
