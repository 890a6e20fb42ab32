//! Calendar mirroring for accepted swaps.
//!
//! [`CalendarMirror`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and reacts to `swap.accepted` events by POSTing each exchanged slot to
//! its new owner's calendar webhook, so external calendars catch up with
//! the ownership change. Delivery is best-effort: the swap is already
//! committed by the time an event arrives, and a dead endpoint only
//! produces log output, never an unwound swap.

use std::time::Duration;

use slotswap_core::types::DbId;
use slotswap_db::models::slot::Slot;
use slotswap_db::repositories::{SlotRepo, SwapRequestRepo, UserRepo};
use slotswap_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::{DomainEvent, SWAP_ACCEPTED};

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for calendar mirror failures.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The calendar endpoint returned a non-2xx status code.
    #[error("Calendar endpoint returned HTTP {0}")]
    HttpStatus(u16),

    /// Reading the swap state back from the database failed.
    #[error("Database read failed: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// CalendarMirror
// ---------------------------------------------------------------------------

/// Background service that mirrors accepted swaps to external calendars.
pub struct CalendarMirror {
    pool: DbPool,
    client: reqwest::Client,
}

impl CalendarMirror {
    /// Create a new mirror with a pre-configured HTTP client.
    pub fn new(pool: DbPool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { pool, client }
    }

    /// Run the mirror loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and pushes
    /// calendar updates for every accepted swap it sees. Other event types
    /// leave calendars untouched (a rejected swap never moved anything).
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) if event.event_type == SWAP_ACCEPTED => {
                    let Some(request_id) = event.swap_request_id else {
                        tracing::warn!("swap.accepted event without a request id, skipping");
                        continue;
                    };
                    if let Err(e) = self.mirror_accepted(request_id).await {
                        tracing::error!(
                            error = %e,
                            swap_request_id = request_id,
                            "Failed to mirror accepted swap"
                        );
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Calendar mirror lagged, some swaps were not mirrored"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, calendar mirror shutting down");
                    break;
                }
            }
        }
    }

    /// Push both slots of an accepted swap to their new owners' calendars.
    ///
    /// The slot rows already carry the exchanged owners by the time the
    /// event is published. Each push is independent: one dead endpoint must
    /// not starve the other party of their update.
    async fn mirror_accepted(&self, request_id: DbId) -> Result<(), sqlx::Error> {
        let request = SwapRequestRepo::find_by_id(&self.pool, request_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        for slot_id in [request.my_slot_id, request.their_slot_id] {
            if let Err(e) = self.push_slot(slot_id).await {
                tracing::error!(
                    error = %e,
                    slot_id,
                    swap_request_id = request_id,
                    "Calendar push failed after all retries"
                );
            }
        }
        Ok(())
    }

    /// Push one slot to its owner's calendar endpoint, if one is connected.
    async fn push_slot(&self, slot_id: DbId) -> Result<(), MirrorError> {
        let slot = SlotRepo::find_by_id(&self.pool, slot_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        let owner = UserRepo::find_by_id(&self.pool, slot.owner_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let Some(url) = owner.calendar_webhook_url else {
            tracing::debug!(
                user_id = owner.id,
                slot_id,
                "No calendar connected, skipping push"
            );
            return Ok(());
        };

        self.deliver(&url, &Self::slot_payload(&slot)).await
    }

    /// The JSON body a calendar endpoint receives for one slot.
    fn slot_payload(slot: &Slot) -> serde_json::Value {
        serde_json::json!({
            "slot_id": slot.id,
            "external_ref": slot.external_ref,
            "title": slot.title,
            "start_time": slot.start_time,
            "end_time": slot.end_time,
            "owner_id": slot.owner_id,
        })
    }

    /// Deliver a payload to a calendar URL with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns `Ok(())` on the first successful attempt, or the error from
    /// the final attempt once the retries are exhausted.
    async fn deliver(&self, url: &str, payload: &serde_json::Value) -> Result<(), MirrorError> {
        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(url, payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url,
                        error = %e,
                        "Calendar push attempt failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        self.try_send(url, payload).await
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, payload: &serde_json::Value) -> Result<(), MirrorError> {
        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(MirrorError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
