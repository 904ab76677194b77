//! Unified error types for the billing engine.
//!
//! The taxonomy has three failure classes: an entity that is absent or not
//! owned by the acting mentor, a state or argument precondition violation, and
//! an opaque failure from the persistence layer. Ownership is enforced by
//! filtering on the mentor id alongside the key in every lookup, so an unowned
//! record is indistinguishable from a missing one.

use thiserror::Error;

/// All errors the billing core can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested record does not exist or is not owned by the acting mentor.
    #[error("{entity} not found")]
    NotFound {
        /// Human-readable entity name, e.g. `"financial plan"`
        entity: &'static str,
    },

    /// A state or argument precondition was violated.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the violated precondition
        message: String,
    },

    /// Opaque failure from the persistence layer.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
