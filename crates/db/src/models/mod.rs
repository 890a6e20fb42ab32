//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Response views safe to serialize to API clients
//! - Create/update DTOs (update DTOs use all-`Option` fields for patches)

pub mod session;
pub mod slot;
pub mod swap_request;
pub mod user;
