//! Error types for the content manager module.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by [`ContentManagerClient`](crate::ContentManagerClient).
///
/// Each variant maps to one outcome class: forbidden, not found, client error
/// and server error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentManagerError {
    /// The caller lacks a grant for the action, or for this record.
    #[error("forbidden")]
    Forbidden,

    #[error("entry not found: {id}")]
    NotFound { id: Uuid },

    /// The request is malformed or not applicable (unknown content type,
    /// invalid bulk-delete body, invalid publication state).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Storage or other server-side failure. Details are logged, not returned.
    #[error("internal error")]
    Internal,
}

impl ContentManagerError {
    #[must_use]
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
