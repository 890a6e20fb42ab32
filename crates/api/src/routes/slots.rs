//! Route definitions for calendar slots.
//!
//! Mounted at `/slots` by `api_routes()`. `/available` and `/import` come
//! before `/{id}` so the literal segments are not captured as ids.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::slots;
use crate::state::AppState;

/// ```text
/// GET    /            -> list_slots (caller's own)
/// POST   /            -> create_slot
/// GET    /available   -> list_available (?search, start_after, end_before, duration_minutes)
/// POST   /import      -> import_slots
/// PUT    /{id}        -> update_slot
/// DELETE /{id}        -> delete_slot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(slots::list_slots).post(slots::create_slot))
        .route("/available", get(slots::list_available))
        .route("/import", post(slots::import_slots))
        .route(
            "/{id}",
            put(slots::update_slot).delete(slots::delete_slot),
        )
}
