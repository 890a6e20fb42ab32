use crate::types::DbId;

/// Domain error taxonomy shared by every layer.
///
/// The API layer maps each variant to an HTTP status; the db layer raises
/// them from precondition checks before mutating anything.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A state-machine precondition failed (e.g. responding to an already
    /// resolved swap request, or offering a slot that is not swappable).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
