//! Domain layer for the slot swap service.
//!
//! Holds the shared vocabulary used by every other crate: id and timestamp
//! aliases, the [`error::CoreError`] taxonomy, status enums mirroring the
//! database lookup tables, and the pure validation rules for slot CRUD and
//! the swap state machine. Nothing in this crate touches the database or the
//! network, so every rule here is unit-testable in isolation.

pub mod account;
pub mod error;
pub mod slot;
pub mod status;
pub mod swap;
pub mod types;
