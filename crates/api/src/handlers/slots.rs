//! Handlers for the `/slots` resource.
//!
//! Slot CRUD is owner-scoped and deliberately simple; everything that
//! touches two slots at once goes through the swap engine instead. The one
//! rule enforced here is that a slot locked by a pending swap (SWAP_PENDING)
//! cannot be edited, retoggled, or deleted until the request resolves.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use slotswap_core::error::CoreError;
use slotswap_core::slot::{validate_time_range, validate_title};
use slotswap_core::status::SlotStatus;
use slotswap_core::types::{DbId, Timestamp};
use slotswap_db::models::slot::{
    AvailableSlotFilters, CreateSlot, ImportSlot, Slot, SlotResponse, UpdateSlot,
};
use slotswap_db::repositories::SlotRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /slots`.
#[derive(Debug, Deserialize)]
pub struct CreateSlotRequest {
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Optional status name; defaults to BUSY. SWAP_PENDING is not settable.
    pub status: Option<String>,
}

/// Request body for `PUT /slots/{id}`. Absent fields keep their values.
#[derive(Debug, Deserialize)]
pub struct UpdateSlotRequest {
    pub title: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub status: Option<String>,
}

/// Request body for `POST /slots/import`.
#[derive(Debug, Deserialize)]
pub struct ImportSlotsRequest {
    pub events: Vec<ImportSlot>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/slots
///
/// Create a slot owned by the caller.
pub async fn create_slot(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSlotRequest>,
) -> AppResult<impl IntoResponse> {
    validate_title(&input.title).map_err(AppError::BadRequest)?;
    validate_time_range(input.start_time, input.end_time).map_err(AppError::BadRequest)?;

    let status = match input.status.as_deref() {
        None => SlotStatus::Busy,
        Some(name) => parse_settable_status(name)?,
    };

    let slot = SlotRepo::create(
        &state.pool,
        auth.user_id,
        &CreateSlot {
            title: input.title.trim().to_string(),
            start_time: input.start_time,
            end_time: input.end_time,
            status_id: status.id(),
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        slot_id = slot.id,
        status = status.as_str(),
        "Slot created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SlotResponse::from(slot),
        }),
    ))
}

/// GET /api/v1/slots
///
/// List the caller's own slots, earliest start first.
pub async fn list_slots(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let slots = SlotRepo::list_by_owner(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: slots.into_iter().map(SlotResponse::from).collect::<Vec<_>>(),
    }))
}

/// GET /api/v1/slots/available
///
/// Browse other users' swappable slots. Never includes the caller's own
/// slots nor any slot outside SWAPPABLE.
pub async fn list_available(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filters): Query<AvailableSlotFilters>,
) -> AppResult<impl IntoResponse> {
    if let Some(mins) = filters.duration_minutes {
        if mins <= 0 {
            return Err(AppError::BadRequest(
                "duration_minutes must be positive".to_string(),
            ));
        }
    }

    let slots = SlotRepo::list_available(&state.pool, auth.user_id, &filters).await?;
    Ok(Json(DataResponse {
        data: slots.into_iter().map(SlotResponse::from).collect::<Vec<_>>(),
    }))
}

/// PUT /api/v1/slots/{id}
///
/// Patch a slot the caller owns. Only provided fields are applied; a slot
/// locked by a pending swap is refused outright.
pub async fn update_slot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSlotRequest>,
) -> AppResult<impl IntoResponse> {
    let slot = fetch_owned_slot(&state, id, auth.user_id).await?;
    ensure_not_swap_locked(&slot)?;

    if let Some(ref title) = input.title {
        validate_title(title).map_err(AppError::BadRequest)?;
    }

    // Validate the time range the slot would end up with, mixing patched
    // and existing values.
    let effective_start = input.start_time.unwrap_or(slot.start_time);
    let effective_end = input.end_time.unwrap_or(slot.end_time);
    validate_time_range(effective_start, effective_end).map_err(AppError::BadRequest)?;

    let status_id = input
        .status
        .as_deref()
        .map(parse_settable_status)
        .transpose()?
        .map(SlotStatus::id);

    let updated = SlotRepo::update(
        &state.pool,
        id,
        &UpdateSlot {
            title: input.title.map(|t| t.trim().to_string()),
            start_time: input.start_time,
            end_time: input.end_time,
            status_id,
        },
    )
    .await?
    // The guarded UPDATE skips SWAP_PENDING rows, so a proposal that won a
    // race after our precondition read surfaces here.
    .ok_or_else(|| {
        AppError::Core(CoreError::InvalidState(
            "Slot is locked by a pending swap request".to_string(),
        ))
    })?;

    tracing::info!(user_id = auth.user_id, slot_id = id, "Slot updated");

    Ok(Json(DataResponse {
        data: SlotResponse::from(updated),
    }))
}

/// DELETE /api/v1/slots/{id}
///
/// Delete a slot the caller owns, unless a pending swap references it.
pub async fn delete_slot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let slot = fetch_owned_slot(&state, id, auth.user_id).await?;
    ensure_not_swap_locked(&slot)?;

    let deleted = SlotRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::InvalidState(
            "Slot is locked by a pending swap request".to_string(),
        )));
    }

    tracing::info!(user_id = auth.user_id, slot_id = id, "Slot deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/slots/import
///
/// Bulk upsert of externally-synced calendar events, keyed by
/// `(owner, external_ref)`. New rows come in as BUSY; re-imported rows get
/// fresh title/times but keep their current status, so a sync can never
/// unwind swap state.
pub async fn import_slots(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ImportSlotsRequest>,
) -> AppResult<impl IntoResponse> {
    for event in &input.events {
        if event.external_ref.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Every imported event needs a non-empty external_ref".to_string(),
            ));
        }
        validate_title(&event.title).map_err(AppError::BadRequest)?;
        validate_time_range(event.start_time, event.end_time).map_err(AppError::BadRequest)?;
    }

    let mut imported = Vec::with_capacity(input.events.len());
    for event in &input.events {
        let slot = SlotRepo::upsert_external(&state.pool, auth.user_id, event).await?;
        imported.push(SlotResponse::from(slot));
    }

    tracing::info!(
        user_id = auth.user_id,
        count = imported.len(),
        "External calendar events imported"
    );

    Ok(Json(DataResponse { data: imported }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a slot and assert the caller owns it.
async fn fetch_owned_slot(state: &AppState, id: DbId, user_id: DbId) -> Result<Slot, AppError> {
    let slot = SlotRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Slot", id }))?;

    if slot.owner_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this slot".to_string(),
        )));
    }
    Ok(slot)
}

/// Refuse any manual mutation of a slot a pending swap references.
fn ensure_not_swap_locked(slot: &Slot) -> Result<(), AppError> {
    if slot.status_id == SlotStatus::SwapPending.id() {
        return Err(AppError::Core(CoreError::InvalidState(
            "Slot is locked by a pending swap request".to_string(),
        )));
    }
    Ok(())
}

/// Parse a status name users are allowed to set manually.
///
/// SWAP_PENDING is owned by the swap engine and rejected here.
fn parse_settable_status(name: &str) -> Result<SlotStatus, AppError> {
    let status = SlotStatus::parse(name)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown slot status '{name}'")))?;

    if status == SlotStatus::SwapPending {
        return Err(AppError::BadRequest(
            "Slot status can only be set to BUSY or SWAPPABLE".to_string(),
        ));
    }
    Ok(status)
}
