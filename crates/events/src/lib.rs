//! Slotswap event bus and calendar notification infrastructure.
//!
//! This crate provides the building blocks for reacting to swap outcomes
//! outside the request/response cycle:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] — the canonical domain event envelope.
//! - [`CalendarMirror`] — background service that pushes the slots of an
//!   accepted swap to each new owner's external calendar endpoint.

pub mod bus;
pub mod calendar;

pub use bus::{DomainEvent, EventBus};
pub use calendar::CalendarMirror;
