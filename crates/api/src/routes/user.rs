//! Route definitions for the current user's calendar connection.
//!
//! Mounted at `/user` by `api_routes()`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// ```text
/// GET /status    -> calendar connection probe
/// PUT /calendar  -> set/clear calendar webhook URL
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(user::status))
        .route("/calendar", put(user::set_calendar))
}
