//! Request-scoped extractors.
//!
//! - [`auth::AuthUser`] -- extracts the authenticated user from a JWT
//!   Bearer token.

pub mod auth;
