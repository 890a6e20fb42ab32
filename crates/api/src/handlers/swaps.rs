//! Handlers for the `/swaps` resource.
//!
//! Thin shims over [`SwapEngine`]: the transactional state machine lives in
//! the db crate, and these handlers only authenticate the caller, publish
//! the post-commit domain event, and assemble the display view. Events go
//! out strictly after the transaction committed, so a subscriber can never
//! observe a swap that later rolled back.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use slotswap_core::types::DbId;
use slotswap_db::models::swap_request::SwapRequest;
use slotswap_db::repositories::{SwapEngine, SwapRequestRepo};
use slotswap_events::bus::{DomainEvent, SWAP_ACCEPTED, SWAP_PROPOSED, SWAP_REJECTED};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /swaps`.
#[derive(Debug, Deserialize)]
pub struct ProposeRequest {
    pub my_slot_id: DbId,
    pub their_slot_id: DbId,
}

/// Request body for `POST /swaps/{id}/respond`.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub accept: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/swaps
///
/// Propose exchanging one of the caller's slots for another user's slot.
/// On success both slots are SWAP_PENDING and a PENDING request exists.
pub async fn propose(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ProposeRequest>,
) -> AppResult<impl IntoResponse> {
    let request =
        SwapEngine::propose(&state.pool, auth.user_id, input.my_slot_id, input.their_slot_id)
            .await?;

    tracing::info!(
        user_id = auth.user_id,
        swap_request_id = request.id,
        my_slot_id = request.my_slot_id,
        their_slot_id = request.their_slot_id,
        requested_user_id = request.requested_user_id,
        "Swap proposed"
    );

    publish_swap_event(&state, SWAP_PROPOSED, auth.user_id, &request);

    let detail = SwapRequestRepo::detail(&state.pool, request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/swaps
///
/// List every swap request the caller is party to, newest first.
pub async fn list_swaps(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let details = SwapRequestRepo::list_details_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: details }))
}

/// POST /api/v1/swaps/{id}/respond
///
/// Accept or reject a pending swap request addressed to the caller. Accept
/// exchanges the two owners and parks both slots BUSY; reject releases both
/// slots back to SWAPPABLE. Either way the request reaches its terminal
/// status atomically with the slot writes.
pub async fn respond(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RespondRequest>,
) -> AppResult<impl IntoResponse> {
    let request = SwapEngine::respond(&state.pool, id, auth.user_id, input.accept).await?;

    tracing::info!(
        user_id = auth.user_id,
        swap_request_id = request.id,
        accepted = input.accept,
        "Swap request resolved"
    );

    let event_type = if input.accept {
        SWAP_ACCEPTED
    } else {
        SWAP_REJECTED
    };
    publish_swap_event(&state, event_type, auth.user_id, &request);

    let detail = SwapRequestRepo::detail(&state.pool, request).await?;
    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Publish a swap lifecycle event on the bus. Best-effort by construction:
/// the bus drops events when nobody listens.
fn publish_swap_event(state: &AppState, event_type: &str, actor: DbId, request: &SwapRequest) {
    state.event_bus.publish(
        DomainEvent::new(event_type)
            .with_swap_request(request.id)
            .with_actor(actor)
            .with_payload(serde_json::json!({
                "my_slot_id": request.my_slot_id,
                "their_slot_id": request.their_slot_id,
                "requester_id": request.requester_id,
                "requested_user_id": request.requested_user_id,
            })),
    );
}
