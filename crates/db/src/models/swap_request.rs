//! Swap request entity model and response views.

use serde::Serialize;
use slotswap_core::status::{StatusId, SwapRequestStatus};
use slotswap_core::swap::SwapRequestView;
use slotswap_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use crate::models::slot::SlotResponse;
use crate::models::user::UserSummary;

/// Full swap request row from the `swap_requests` table.
///
/// Immutable after creation except for `status_id`/`resolved_at`, which the
/// swap engine sets exactly once.
#[derive(Debug, Clone, FromRow)]
pub struct SwapRequest {
    pub id: DbId,
    pub status_id: StatusId,
    pub requester_id: DbId,
    pub requested_user_id: DbId,
    pub my_slot_id: DbId,
    pub their_slot_id: DbId,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SwapRequest {
    /// Project the fields the core precondition checks need.
    pub fn view(&self) -> SwapRequestView {
        SwapRequestView {
            id: self.id,
            status_id: self.status_id,
            requester_id: self.requester_id,
            requested_user_id: self.requested_user_id,
        }
    }
}

/// Swap request representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SwapRequestResponse {
    pub id: DbId,
    pub status: &'static str,
    pub requester_id: DbId,
    pub requested_user_id: DbId,
    pub my_slot_id: DbId,
    pub their_slot_id: DbId,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<SwapRequest> for SwapRequestResponse {
    fn from(request: SwapRequest) -> Self {
        Self {
            id: request.id,
            status: SwapRequestStatus::from_id(request.status_id)
                .map(SwapRequestStatus::as_str)
                .unwrap_or("UNKNOWN"),
            requester_id: request.requester_id,
            requested_user_id: request.requested_user_id,
            my_slot_id: request.my_slot_id,
            their_slot_id: request.their_slot_id,
            resolved_at: request.resolved_at,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// A swap request with fresh snapshots of both slots and both parties,
/// assembled per-row for display.
#[derive(Debug, Serialize)]
pub struct SwapRequestDetail {
    #[serde(flatten)]
    pub request: SwapRequestResponse,
    pub my_slot: SlotResponse,
    pub their_slot: SlotResponse,
    pub requester: UserSummary,
    pub requested_user: UserSummary,
}
