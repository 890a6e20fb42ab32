//! Precondition rules for the swap request state machine.
//!
//! The swap engine reads the affected rows inside its transaction and runs
//! these checks before mutating anything. Checks are ordered; the first
//! failure wins, so callers get stable error responses regardless of how
//! many preconditions are violated at once.

use crate::error::CoreError;
use crate::status::{SlotStatus, StatusId, SwapRequestStatus};
use crate::types::DbId;

/// The slot fields the propose checks need, detached from the full row.
#[derive(Debug, Clone, Copy)]
pub struct SlotView {
    pub id: DbId,
    pub owner_id: DbId,
    pub status_id: StatusId,
}

/// The swap request fields the respond checks need.
#[derive(Debug, Clone, Copy)]
pub struct SwapRequestView {
    pub id: DbId,
    pub status_id: StatusId,
    pub requester_id: DbId,
    pub requested_user_id: DbId,
}

/// Check whether `requester_id` may propose swapping `my_slot` for
/// `their_slot`. On success returns the owner of the requested slot, i.e.
/// the user who must respond.
///
/// Order of checks:
/// 1. The offered slot must exist and belong to the requester (ownership is
///    asserted before existence is revealed, so both failures read the same).
/// 2. The requested slot must exist.
/// 3. The two slots must have different owners (also rules out offering a
///    slot for itself).
/// 4. The offered slot must be SWAPPABLE.
/// 5. The requested slot must be SWAPPABLE.
pub fn ensure_can_propose(
    requester_id: DbId,
    their_slot_id: DbId,
    my_slot: Option<SlotView>,
    their_slot: Option<SlotView>,
) -> Result<DbId, CoreError> {
    let my_slot = match my_slot {
        Some(slot) if slot.owner_id == requester_id => slot,
        _ => {
            return Err(CoreError::Forbidden(
                "You can only offer a slot you own".to_string(),
            ))
        }
    };

    let their_slot = their_slot.ok_or(CoreError::NotFound {
        entity: "Slot",
        id: their_slot_id,
    })?;

    if their_slot.owner_id == requester_id {
        return Err(CoreError::InvalidState(
            "Both slots belong to the same user".to_string(),
        ));
    }

    if my_slot.status_id != SlotStatus::Swappable.id() {
        return Err(CoreError::InvalidState(
            "Your slot is not marked as swappable".to_string(),
        ));
    }

    if their_slot.status_id != SlotStatus::Swappable.id() {
        return Err(CoreError::InvalidState(
            "The requested slot is not marked as swappable".to_string(),
        ));
    }

    Ok(their_slot.owner_id)
}

/// Check whether `responder_id` may resolve the given swap request.
///
/// Only the requested user may respond, and only while the request is still
/// PENDING. Existence is the caller's concern (a missing row is NotFound
/// before this check runs).
pub fn ensure_can_respond(
    responder_id: DbId,
    request: SwapRequestView,
) -> Result<(), CoreError> {
    if request.requested_user_id != responder_id {
        return Err(CoreError::Forbidden(
            "Only the requested user can respond to this swap".to_string(),
        ));
    }

    if request.status_id != SwapRequestStatus::Pending.id() {
        return Err(CoreError::InvalidState(
            "Swap request has already been resolved".to_string(),
        ));
    }

    Ok(())
}
