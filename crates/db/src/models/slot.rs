//! Calendar slot entity model and DTOs.

use serde::{Deserialize, Serialize};
use slotswap_core::status::{SlotStatus, StatusId};
use slotswap_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full slot row from the `slots` table.
#[derive(Debug, Clone, FromRow)]
pub struct Slot {
    pub id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub owner_id: DbId,
    pub status_id: StatusId,
    /// Identifier of the mirrored event in an external calendar, set by import.
    pub external_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Slot representation for API responses: the raw `status_id` is resolved
/// to its seeded name.
#[derive(Debug, Clone, Serialize)]
pub struct SlotResponse {
    pub id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub owner_id: DbId,
    pub status: &'static str,
    pub external_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Slot> for SlotResponse {
    fn from(slot: Slot) -> Self {
        Self {
            id: slot.id,
            title: slot.title,
            start_time: slot.start_time,
            end_time: slot.end_time,
            owner_id: slot.owner_id,
            status: SlotStatus::from_id(slot.status_id)
                .map(SlotStatus::as_str)
                .unwrap_or("UNKNOWN"),
            external_ref: slot.external_ref,
            created_at: slot.created_at,
            updated_at: slot.updated_at,
        }
    }
}

/// DTO for creating a new slot. The status is resolved from its API name by
/// the handler before this reaches the repository.
pub struct CreateSlot {
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status_id: StatusId,
}

/// DTO for patching a slot. Only non-`None` fields are applied; absent
/// fields keep their current values.
#[derive(Debug, Default)]
pub struct UpdateSlot {
    pub title: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub status_id: Option<StatusId>,
}

/// One externally-synced calendar event, upserted by `(owner, external_ref)`.
#[derive(Debug, Deserialize)]
pub struct ImportSlot {
    pub external_ref: String,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// Query filters for the swappable-slot marketplace listing.
///
/// Date bounds are applied in SQL; `search` and `duration_minutes` are
/// applied in memory after the fetch (see `slotswap_core::slot`).
#[derive(Debug, Default, Deserialize)]
pub struct AvailableSlotFilters {
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// Only slots starting at or after this instant.
    pub start_after: Option<Timestamp>,
    /// Only slots ending at or before this instant.
    pub end_before: Option<Timestamp>,
    /// Only slots whose duration is within the fixed tolerance of this.
    pub duration_minutes: Option<i64>,
}
