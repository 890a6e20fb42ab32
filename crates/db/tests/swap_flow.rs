//! Integration tests for the swap engine.
//!
//! Exercises the full propose/respond state machine against a real database:
//! - Propose preconditions, checked in order against locked rows
//! - Accept (ownership exchange) and reject (slots released) atomicity
//! - Responder authorization and terminal-state protection
//! - Concurrent responses racing on the same request
//! - Listing and detail composition

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use slotswap_core::error::CoreError;
use slotswap_core::status::{SlotStatus, SwapRequestStatus};
use slotswap_core::types::DbId;
use slotswap_db::models::slot::{CreateSlot, Slot};
use slotswap_db::models::user::{CreateUser, User};
use slotswap_db::repositories::{SlotRepo, SwapEngine, SwapError, SwapRequestRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: email.split('@').next().unwrap().to_string(),
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .unwrap()
}

async fn create_slot(
    pool: &PgPool,
    owner_id: DbId,
    title: &str,
    hour: u32,
    status: SlotStatus,
) -> Slot {
    let start = Utc.with_ymd_and_hms(2025, 6, 2, hour, 0, 0).unwrap();
    SlotRepo::create(
        pool,
        owner_id,
        &CreateSlot {
            title: title.to_string(),
            start_time: start,
            end_time: start + Duration::hours(1),
            status_id: status.id(),
        },
    )
    .await
    .unwrap()
}

/// Two users, each with one swappable slot.
async fn swap_fixture(pool: &PgPool) -> (User, User, Slot, Slot) {
    let alice = create_user(pool, "alice@example.com").await;
    let bob = create_user(pool, "bob@example.com").await;
    let alice_slot = create_slot(pool, alice.id, "Alice shift", 9, SlotStatus::Swappable).await;
    let bob_slot = create_slot(pool, bob.id, "Bob shift", 14, SlotStatus::Swappable).await;
    (alice, bob, alice_slot, bob_slot)
}

async fn slot_state(pool: &PgPool, id: DbId) -> (DbId, i16) {
    let slot = SlotRepo::find_by_id(pool, id).await.unwrap().unwrap();
    (slot.owner_id, slot.status_id)
}

async fn request_count(pool: &PgPool) -> i64 {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM swap_requests")
        .fetch_one(pool)
        .await
        .unwrap();
    count.0
}

// ---------------------------------------------------------------------------
// Test: Propose creates a PENDING request and parks both slots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_propose_creates_pending_and_parks_slots(pool: PgPool) {
    let (alice, bob, alice_slot, bob_slot) = swap_fixture(&pool).await;

    let request = SwapEngine::propose(&pool, alice.id, alice_slot.id, bob_slot.id)
        .await
        .unwrap();
    assert_eq!(request.status_id, SwapRequestStatus::Pending.id());
    assert_eq!(request.requester_id, alice.id);
    assert_eq!(request.requested_user_id, bob.id);
    assert_eq!(request.my_slot_id, alice_slot.id);
    assert_eq!(request.their_slot_id, bob_slot.id);
    assert!(request.resolved_at.is_none());

    // Both slots left the marketplace together.
    assert_eq!(
        slot_state(&pool, alice_slot.id).await,
        (alice.id, SlotStatus::SwapPending.id())
    );
    assert_eq!(
        slot_state(&pool, bob_slot.id).await,
        (bob.id, SlotStatus::SwapPending.id())
    );
}

// ---------------------------------------------------------------------------
// Test: The offered slot must exist and belong to the requester
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_propose_requires_owning_offered_slot(pool: PgPool) {
    let (alice, _bob, alice_slot, bob_slot) = swap_fixture(&pool).await;
    let carol = create_user(&pool, "carol@example.com").await;

    // Carol offers Alice's slot.
    let result = SwapEngine::propose(&pool, carol.id, alice_slot.id, bob_slot.id).await;
    assert_matches!(result, Err(SwapError::Core(CoreError::Forbidden(_))));

    // A nonexistent offered slot reads the same as one you don't own.
    let result = SwapEngine::propose(&pool, alice.id, 999_999, bob_slot.id).await;
    assert_matches!(result, Err(SwapError::Core(CoreError::Forbidden(_))));

    assert_eq!(request_count(&pool).await, 0);
}

// ---------------------------------------------------------------------------
// Test: The requested slot must exist
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_propose_missing_requested_slot_not_found(pool: PgPool) {
    let (alice, _bob, alice_slot, _bob_slot) = swap_fixture(&pool).await;

    let result = SwapEngine::propose(&pool, alice.id, alice_slot.id, 999_999).await;
    assert_matches!(
        result,
        Err(SwapError::Core(CoreError::NotFound {
            entity: "Slot",
            id: 999_999
        }))
    );
}

// ---------------------------------------------------------------------------
// Test: Swapping with yourself is rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_propose_own_slot_pair_rejected(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com").await;
    let first = create_slot(&pool, alice.id, "First", 9, SlotStatus::Swappable).await;
    let second = create_slot(&pool, alice.id, "Second", 14, SlotStatus::Swappable).await;

    let result = SwapEngine::propose(&pool, alice.id, first.id, second.id).await;
    assert_matches!(
        result,
        Err(SwapError::Core(CoreError::InvalidState(msg)))
            if msg == "Both slots belong to the same user"
    );
}

// ---------------------------------------------------------------------------
// Test: Both slots must be SWAPPABLE, and a failed propose writes nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_propose_requires_swappable_slots(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com").await;
    let bob = create_user(&pool, "bob@example.com").await;
    let alice_busy = create_slot(&pool, alice.id, "Alice busy", 9, SlotStatus::Busy).await;
    let bob_busy = create_slot(&pool, bob.id, "Bob busy", 14, SlotStatus::Busy).await;
    let alice_open = create_slot(&pool, alice.id, "Alice open", 11, SlotStatus::Swappable).await;

    let result = SwapEngine::propose(&pool, alice.id, alice_busy.id, bob_busy.id).await;
    assert_matches!(
        result,
        Err(SwapError::Core(CoreError::InvalidState(msg)))
            if msg == "Your slot is not marked as swappable"
    );

    let result = SwapEngine::propose(&pool, alice.id, alice_open.id, bob_busy.id).await;
    assert_matches!(
        result,
        Err(SwapError::Core(CoreError::InvalidState(msg)))
            if msg == "The requested slot is not marked as swappable"
    );

    // Nothing was written by either failure.
    assert_eq!(request_count(&pool).await, 0);
    assert_eq!(
        slot_state(&pool, alice_open.id).await,
        (alice.id, SlotStatus::Swappable.id())
    );
    assert_eq!(
        slot_state(&pool, bob_busy.id).await,
        (bob.id, SlotStatus::Busy.id())
    );
}

// ---------------------------------------------------------------------------
// Test: A slot already caught in a pending swap cannot be requested again
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pending_slot_cannot_be_requested_again(pool: PgPool) {
    let (alice, _bob, alice_slot, bob_slot) = swap_fixture(&pool).await;
    let carol = create_user(&pool, "carol@example.com").await;
    let carol_slot = create_slot(&pool, carol.id, "Carol shift", 16, SlotStatus::Swappable).await;

    SwapEngine::propose(&pool, alice.id, alice_slot.id, bob_slot.id)
        .await
        .unwrap();

    // Bob's slot is now SWAP_PENDING; Carol's proposal loses.
    let result = SwapEngine::propose(&pool, carol.id, carol_slot.id, bob_slot.id).await;
    assert_matches!(
        result,
        Err(SwapError::Core(CoreError::InvalidState(msg)))
            if msg == "The requested slot is not marked as swappable"
    );
    assert_eq!(request_count(&pool).await, 1);
}

// ---------------------------------------------------------------------------
// Test: Accept exchanges owners and parks both slots as BUSY
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_accept_swaps_owners_atomically(pool: PgPool) {
    let (alice, bob, alice_slot, bob_slot) = swap_fixture(&pool).await;
    let request = SwapEngine::propose(&pool, alice.id, alice_slot.id, bob_slot.id)
        .await
        .unwrap();

    let resolved = SwapEngine::respond(&pool, request.id, bob.id, true)
        .await
        .unwrap();
    assert_eq!(resolved.status_id, SwapRequestStatus::Accepted.id());
    assert!(resolved.resolved_at.is_some());

    // Alice's old slot now belongs to Bob and vice versa; both are BUSY.
    assert_eq!(
        slot_state(&pool, alice_slot.id).await,
        (bob.id, SlotStatus::Busy.id())
    );
    assert_eq!(
        slot_state(&pool, bob_slot.id).await,
        (alice.id, SlotStatus::Busy.id())
    );
}

// ---------------------------------------------------------------------------
// Test: Reject releases both slots with owners unchanged
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_keeps_owners_and_releases_slots(pool: PgPool) {
    let (alice, bob, alice_slot, bob_slot) = swap_fixture(&pool).await;
    let request = SwapEngine::propose(&pool, alice.id, alice_slot.id, bob_slot.id)
        .await
        .unwrap();

    let resolved = SwapEngine::respond(&pool, request.id, bob.id, false)
        .await
        .unwrap();
    assert_eq!(resolved.status_id, SwapRequestStatus::Rejected.id());
    assert!(resolved.resolved_at.is_some());

    // Both slots are back on the marketplace under their original owners.
    assert_eq!(
        slot_state(&pool, alice_slot.id).await,
        (alice.id, SlotStatus::Swappable.id())
    );
    assert_eq!(
        slot_state(&pool, bob_slot.id).await,
        (bob.id, SlotStatus::Swappable.id())
    );
}

// ---------------------------------------------------------------------------
// Test: Only the requested user may respond
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_respond_requires_requested_user(pool: PgPool) {
    let (alice, _bob, alice_slot, bob_slot) = swap_fixture(&pool).await;
    let carol = create_user(&pool, "carol@example.com").await;
    let request = SwapEngine::propose(&pool, alice.id, alice_slot.id, bob_slot.id)
        .await
        .unwrap();

    // The requester cannot accept their own proposal.
    let result = SwapEngine::respond(&pool, request.id, alice.id, true).await;
    assert_matches!(result, Err(SwapError::Core(CoreError::Forbidden(_))));

    // Neither can a bystander.
    let result = SwapEngine::respond(&pool, request.id, carol.id, true).await;
    assert_matches!(result, Err(SwapError::Core(CoreError::Forbidden(_))));

    let unchanged = SwapRequestRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status_id, SwapRequestStatus::Pending.id());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_respond_missing_request_not_found(pool: PgPool) {
    let bob = create_user(&pool, "bob@example.com").await;

    let result = SwapEngine::respond(&pool, 999_999, bob.id, true).await;
    assert_matches!(
        result,
        Err(SwapError::Core(CoreError::NotFound {
            entity: "SwapRequest",
            id: 999_999
        }))
    );
}

// ---------------------------------------------------------------------------
// Test: A resolved request is terminal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_respond_after_resolution_rejected(pool: PgPool) {
    let (alice, bob, alice_slot, bob_slot) = swap_fixture(&pool).await;
    let request = SwapEngine::propose(&pool, alice.id, alice_slot.id, bob_slot.id)
        .await
        .unwrap();

    SwapEngine::respond(&pool, request.id, bob.id, true)
        .await
        .unwrap();

    // A later reject cannot unwind the accepted swap.
    let result = SwapEngine::respond(&pool, request.id, bob.id, false).await;
    assert_matches!(
        result,
        Err(SwapError::Core(CoreError::InvalidState(msg)))
            if msg == "Swap request has already been resolved"
    );
    assert_eq!(
        slot_state(&pool, alice_slot.id).await,
        (bob.id, SlotStatus::Busy.id())
    );
}

// ---------------------------------------------------------------------------
// Test: Concurrent responses race; exactly one wins
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_responses_single_winner(pool: PgPool) {
    let (alice, bob, alice_slot, bob_slot) = swap_fixture(&pool).await;
    let request = SwapEngine::propose(&pool, alice.id, alice_slot.id, bob_slot.id)
        .await
        .unwrap();

    // Both responses hit the same request at once; the row lock serializes
    // them and the status predicate turns the loser away.
    let (accept, reject) = tokio::join!(
        SwapEngine::respond(&pool, request.id, bob.id, true),
        SwapEngine::respond(&pool, request.id, bob.id, false),
    );

    let winners = [accept.is_ok(), reject.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(winners, 1, "exactly one response should win the race");

    let accept_won = accept.is_ok();
    let loser = if accept_won { reject } else { accept };
    assert_matches!(
        loser,
        Err(SwapError::Core(CoreError::InvalidState(msg)))
            if msg == "Swap request has already been resolved"
    );

    // Final state is fully consistent with whichever response won.
    let resolved = SwapRequestRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    if accept_won {
        assert_eq!(resolved.status_id, SwapRequestStatus::Accepted.id());
        assert_eq!(
            slot_state(&pool, alice_slot.id).await,
            (bob.id, SlotStatus::Busy.id())
        );
        assert_eq!(
            slot_state(&pool, bob_slot.id).await,
            (alice.id, SlotStatus::Busy.id())
        );
    } else {
        assert_eq!(resolved.status_id, SwapRequestStatus::Rejected.id());
        assert_eq!(
            slot_state(&pool, alice_slot.id).await,
            (alice.id, SlotStatus::Swappable.id())
        );
        assert_eq!(
            slot_state(&pool, bob_slot.id).await,
            (bob.id, SlotStatus::Swappable.id())
        );
    }
}

// ---------------------------------------------------------------------------
// Test: Listing returns both directions, newest first
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_user_newest_first(pool: PgPool) {
    let (alice, bob, alice_slot, bob_slot) = swap_fixture(&pool).await;
    let carol = create_user(&pool, "carol@example.com").await;
    let carol_slot = create_slot(&pool, carol.id, "Carol shift", 16, SlotStatus::Swappable).await;
    let bob_second = create_slot(&pool, bob.id, "Bob evening", 18, SlotStatus::Swappable).await;

    let first = SwapEngine::propose(&pool, alice.id, alice_slot.id, bob_slot.id)
        .await
        .unwrap();
    let second = SwapEngine::propose(&pool, carol.id, carol_slot.id, bob_second.id)
        .await
        .unwrap();

    // Bob is the requested user on both.
    let bob_requests = SwapRequestRepo::list_for_user(&pool, bob.id).await.unwrap();
    assert_eq!(bob_requests.len(), 2);
    assert_eq!(bob_requests[0].id, second.id);
    assert_eq!(bob_requests[1].id, first.id);

    // Requesters see their own proposals too.
    let alice_requests = SwapRequestRepo::list_for_user(&pool, alice.id)
        .await
        .unwrap();
    assert_eq!(alice_requests.len(), 1);
    assert_eq!(alice_requests[0].id, first.id);

    // Bystanders see nothing.
    let dave = create_user(&pool, "dave@example.com").await;
    assert!(SwapRequestRepo::list_for_user(&pool, dave.id)
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Test: Detail composes fresh slot and user snapshots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_detail_composes_snapshots(pool: PgPool) {
    let (alice, bob, alice_slot, bob_slot) = swap_fixture(&pool).await;
    let request = SwapEngine::propose(&pool, alice.id, alice_slot.id, bob_slot.id)
        .await
        .unwrap();

    let detail = SwapRequestRepo::detail(&pool, request.clone()).await.unwrap();
    assert_eq!(detail.request.id, request.id);
    assert_eq!(detail.request.status, "PENDING");
    assert_eq!(detail.my_slot.id, alice_slot.id);
    assert_eq!(detail.my_slot.status, "SWAP_PENDING");
    assert_eq!(detail.their_slot.id, bob_slot.id);
    assert_eq!(detail.requester.email, "alice@example.com");
    assert_eq!(detail.requested_user.email, "bob@example.com");

    // After acceptance the snapshots reflect the exchanged owners.
    SwapEngine::respond(&pool, request.id, bob.id, true)
        .await
        .unwrap();
    let details = SwapRequestRepo::list_details_for_user(&pool, alice.id)
        .await
        .unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].request.status, "ACCEPTED");
    assert_eq!(details[0].my_slot.owner_id, bob.id);
    assert_eq!(details[0].their_slot.owner_id, alice.id);
    assert_eq!(details[0].my_slot.status, "BUSY");
}
