//! Transactional orchestrator for the swap request state machine.
//!
//! Every operation runs inside a single transaction: precondition reads
//! take row locks (`SELECT ... FOR UPDATE`), the precondition rules from
//! `slotswap_core::swap` run against the locked rows, and all writes commit
//! or roll back together. A slot can therefore never end up swapped without
//! its request resolving, or vice versa.

use slotswap_core::error::CoreError;
use slotswap_core::status::{SlotStatus, SwapRequestStatus};
use slotswap_core::swap::{self, SlotView};
use slotswap_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::swap_request::SwapRequest;
use crate::repositories::swap_request_repo::COLUMNS;

/// Error type for swap engine operations.
#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    /// A precondition failed; nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The underlying transaction failed and was rolled back.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Owns the propose/respond transitions over slots and swap requests.
pub struct SwapEngine;

impl SwapEngine {
    /// Propose exchanging `my_slot_id` (owned by the requester) for
    /// `their_slot_id`.
    ///
    /// On success a PENDING request exists and both slots are SWAP_PENDING,
    /// atomically. Preconditions are checked in a fixed order against locked
    /// rows; see [`swap::ensure_can_propose`].
    pub async fn propose(
        pool: &PgPool,
        requester_id: DbId,
        my_slot_id: DbId,
        their_slot_id: DbId,
    ) -> Result<SwapRequest, SwapError> {
        let mut tx = pool.begin().await?;

        // Lock in ascending id order so concurrent proposals over the same
        // pair of slots cannot deadlock.
        let (my_slot, their_slot) = if my_slot_id == their_slot_id {
            let slot = Self::lock_slot(&mut tx, my_slot_id).await?;
            (slot, slot)
        } else if my_slot_id < their_slot_id {
            let mine = Self::lock_slot(&mut tx, my_slot_id).await?;
            let theirs = Self::lock_slot(&mut tx, their_slot_id).await?;
            (mine, theirs)
        } else {
            let theirs = Self::lock_slot(&mut tx, their_slot_id).await?;
            let mine = Self::lock_slot(&mut tx, my_slot_id).await?;
            (mine, theirs)
        };

        let requested_user_id =
            swap::ensure_can_propose(requester_id, their_slot_id, my_slot, their_slot)?;

        let query = format!(
            "INSERT INTO swap_requests
                (status_id, requester_id, requested_user_id, my_slot_id, their_slot_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, SwapRequest>(&query)
            .bind(SwapRequestStatus::Pending.id())
            .bind(requester_id)
            .bind(requested_user_id)
            .bind(my_slot_id)
            .bind(their_slot_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE slots SET status_id = $1 WHERE id IN ($2, $3)")
            .bind(SlotStatus::SwapPending.id())
            .bind(my_slot_id)
            .bind(their_slot_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    /// Resolve a PENDING request: accept swaps the two owners and parks both
    /// slots as BUSY; reject returns both slots to SWAPPABLE with owners
    /// unchanged. Either way the request reaches its terminal status in the
    /// same transaction as the slot writes.
    ///
    /// Concurrent responders serialize on the request row lock; the loser
    /// re-reads the winner's terminal status and gets `InvalidState`. The
    /// status predicate on the UPDATE is the final guard: a lost race can
    /// never apply the ownership exchange twice.
    pub async fn respond(
        pool: &PgPool,
        request_id: DbId,
        responder_id: DbId,
        accept: bool,
    ) -> Result<SwapRequest, SwapError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM swap_requests WHERE id = $1 FOR UPDATE");
        let request = sqlx::query_as::<_, SwapRequest>(&query)
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SwapRequest",
                id: request_id,
            })?;

        swap::ensure_can_respond(responder_id, request.view())?;

        let terminal = if accept {
            SwapRequestStatus::Accepted
        } else {
            SwapRequestStatus::Rejected
        };

        let update_query = format!(
            "UPDATE swap_requests SET status_id = $2, resolved_at = NOW()
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        let resolved = sqlx::query_as::<_, SwapRequest>(&update_query)
            .bind(request_id)
            .bind(terminal.id())
            .bind(SwapRequestStatus::Pending.id())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                CoreError::InvalidState("Swap request has already been resolved".to_string())
            })?;

        if accept {
            // Exchange owners; both slots leave the marketplace.
            sqlx::query("UPDATE slots SET owner_id = $2, status_id = $3 WHERE id = $1")
                .bind(resolved.my_slot_id)
                .bind(resolved.requested_user_id)
                .bind(SlotStatus::Busy.id())
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE slots SET owner_id = $2, status_id = $3 WHERE id = $1")
                .bind(resolved.their_slot_id)
                .bind(resolved.requester_id)
                .bind(SlotStatus::Busy.id())
                .execute(&mut *tx)
                .await?;
        } else {
            // Owners unchanged; both slots return to the marketplace.
            sqlx::query("UPDATE slots SET status_id = $1 WHERE id IN ($2, $3)")
                .bind(SlotStatus::Swappable.id())
                .bind(resolved.my_slot_id)
                .bind(resolved.their_slot_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(resolved)
    }

    /// Read one slot under a row lock, projected to the fields the
    /// precondition checks need.
    async fn lock_slot(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<SlotView>, sqlx::Error> {
        let row: Option<(DbId, DbId, i16)> = sqlx::query_as(
            "SELECT id, owner_id, status_id FROM slots WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(|(id, owner_id, status_id)| SlotView {
            id,
            owner_id,
            status_id,
        }))
    }
}
