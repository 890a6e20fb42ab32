//! Repository for the `slots` table.
//!
//! Uses `SlotStatus` from `slotswap_core::status` for all status values.
//! No magic numbers -- every status literal is a named constant.

use slotswap_core::slot::{duration_within_tolerance, title_matches};
use slotswap_core::status::SlotStatus;
use slotswap_core::types::DbId;
use sqlx::PgPool;

use crate::models::slot::{AvailableSlotFilters, CreateSlot, ImportSlot, Slot, UpdateSlot};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, start_time, end_time, owner_id, status_id, \
                        external_ref, created_at, updated_at";

/// Provides CRUD operations for calendar slots.
pub struct SlotRepo;

impl SlotRepo {
    /// Insert a new slot owned by `owner_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateSlot,
    ) -> Result<Slot, sqlx::Error> {
        let query = format!(
            "INSERT INTO slots (title, start_time, end_time, owner_id, status_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(&input.title)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(owner_id)
            .bind(input.status_id)
            .fetch_one(pool)
            .await
    }

    /// Find a slot by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slots WHERE id = $1");
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all slots owned by a user, earliest start first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Slot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM slots WHERE owner_id = $1 ORDER BY start_time ASC"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Patch a slot. Only non-`None` fields in `input` are applied.
    ///
    /// Slots locked by a pending swap are never patched: the guard on
    /// `status_id` makes the update a no-op if a proposal won a race after
    /// the caller's precondition checks. Returns `None` when no row matched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSlot,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!(
            "UPDATE slots SET
                title = COALESCE($2, title),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time),
                status_id = COALESCE($5, status_id)
             WHERE id = $1 AND status_id <> $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.status_id)
            .bind(SlotStatus::SwapPending.id())
            .fetch_optional(pool)
            .await
    }

    /// Delete a slot unless it is locked by a pending swap.
    ///
    /// Returns `true` if the row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM slots WHERE id = $1 AND status_id <> $2")
            .bind(id)
            .bind(SlotStatus::SwapPending.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List swappable slots owned by anyone except `exclude_user`, earliest
    /// start first.
    ///
    /// Status, owner exclusion, and date bounds are SQL predicates; the
    /// title and duration filters run in memory on the fetched page.
    pub async fn list_available(
        pool: &PgPool,
        exclude_user: DbId,
        filters: &AvailableSlotFilters,
    ) -> Result<Vec<Slot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM slots
             WHERE status_id = $1
               AND owner_id <> $2
               AND ($3::timestamptz IS NULL OR start_time >= $3)
               AND ($4::timestamptz IS NULL OR end_time <= $4)
             ORDER BY start_time ASC"
        );
        let mut slots = sqlx::query_as::<_, Slot>(&query)
            .bind(SlotStatus::Swappable.id())
            .bind(exclude_user)
            .bind(filters.start_after)
            .bind(filters.end_before)
            .fetch_all(pool)
            .await?;

        if let Some(ref search) = filters.search {
            slots.retain(|slot| title_matches(&slot.title, search));
        }
        if let Some(requested_mins) = filters.duration_minutes {
            slots.retain(|slot| {
                duration_within_tolerance(slot.start_time, slot.end_time, requested_mins)
            });
        }

        Ok(slots)
    }

    /// Upsert an externally-synced slot keyed on `(owner_id, external_ref)`.
    ///
    /// New rows are created BUSY; existing rows get fresh title and times
    /// but keep their current status and owner, so a re-import never unwinds
    /// swap state.
    pub async fn upsert_external(
        pool: &PgPool,
        owner_id: DbId,
        input: &ImportSlot,
    ) -> Result<Slot, sqlx::Error> {
        let query = format!(
            "INSERT INTO slots (title, start_time, end_time, owner_id, status_id, external_ref)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (owner_id, external_ref) WHERE external_ref IS NOT NULL
             DO UPDATE SET
                title = EXCLUDED.title,
                start_time = EXCLUDED.start_time,
                end_time = EXCLUDED.end_time
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(&input.title)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(owner_id)
            .bind(SlotStatus::Busy.id())
            .bind(&input.external_ref)
            .fetch_one(pool)
            .await
    }
}
