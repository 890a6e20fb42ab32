//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row state changes
//! (propose/respond) live in [`swap_engine::SwapEngine`], which owns the
//! transaction boundaries.

pub mod session_repo;
pub mod slot_repo;
pub mod swap_engine;
pub mod swap_request_repo;
pub mod user_repo;

pub use session_repo::SessionRepo;
pub use slot_repo::SlotRepo;
pub use swap_engine::{SwapEngine, SwapError};
pub use swap_request_repo::SwapRequestRepo;
pub use user_repo::UserRepo;
