//! HTTP request handlers, grouped by resource.

pub mod auth;
pub mod slots;
pub mod swaps;
pub mod user;
