//! Repository for the `swap_requests` table.
//!
//! State transitions live in [`super::swap_engine::SwapEngine`]; this module
//! covers reads and the display-oriented detail assembly.

use slotswap_core::types::DbId;
use sqlx::PgPool;

use crate::models::swap_request::{SwapRequest, SwapRequestDetail};
use crate::repositories::{SlotRepo, UserRepo};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, status_id, requester_id, requested_user_id, my_slot_id, their_slot_id, \
     resolved_at, created_at, updated_at";

/// Provides read operations for swap requests.
pub struct SwapRequestRepo;

impl SwapRequestRepo {
    /// Find a swap request by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM swap_requests WHERE id = $1");
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every request a user is party to (as requester or requested
    /// user), newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SwapRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM swap_requests
             WHERE requester_id = $1 OR requested_user_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Assemble the display view for one request: fresh snapshots of both
    /// slots plus both parties.
    ///
    /// The referenced rows are FK-protected, so a missing one means the
    /// request row is stale and surfaces as `RowNotFound`.
    pub async fn detail(
        pool: &PgPool,
        request: SwapRequest,
    ) -> Result<SwapRequestDetail, sqlx::Error> {
        let my_slot = SlotRepo::find_by_id(pool, request.my_slot_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        let their_slot = SlotRepo::find_by_id(pool, request.their_slot_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        let requester = UserRepo::summary(pool, request.requester_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        let requested_user = UserRepo::summary(pool, request.requested_user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        Ok(SwapRequestDetail {
            request: request.into(),
            my_slot: my_slot.into(),
            their_slot: their_slot.into(),
            requester,
            requested_user,
        })
    }

    /// List a user's requests with full detail, newest first.
    pub async fn list_details_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SwapRequestDetail>, sqlx::Error> {
        let requests = Self::list_for_user(pool, user_id).await?;
        let mut result = Vec::with_capacity(requests.len());

        for request in requests {
            result.push(Self::detail(pool, request).await?);
        }

        Ok(result)
    }
}
