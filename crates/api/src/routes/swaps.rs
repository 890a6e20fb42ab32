//! Route definitions for swap requests.
//!
//! Mounted at `/swaps` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::swaps;
use crate::state::AppState;

/// ```text
/// GET  /               -> list_swaps (caller is requester or requested user)
/// POST /               -> propose
/// POST /{id}/respond   -> respond (accept: bool)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(swaps::list_swaps).post(swaps::propose))
        .route("/{id}/respond", post(swaps::respond))
}
