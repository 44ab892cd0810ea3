//! Domain errors for the content manager.

use content_manager_sdk::{Action, ContentManagerError, EntityManagerError, SchemaError};
use thiserror::Error;
use uuid::Uuid;

/// Internal domain errors.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Access denied")]
    Forbidden,

    #[error("{uid} entry not found: {id}")]
    NotFound { uid: String, id: Uuid },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Unknown content type: {uid}")]
    SchemaNotFound { uid: String },

    #[error("Cannot {} entry {id}: {reason}", .action.name())]
    InvalidTransition {
        action: Action,
        id: Uuid,
        reason: &'static str,
    },

    #[error("Storage error: {0}")]
    Storage(EntityManagerError),
}

impl DomainError {
    #[must_use]
    pub fn not_found(uid: impl Into<String>, id: Uuid) -> Self {
        Self::NotFound {
            uid: uid.into(),
            id,
        }
    }

    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_transition(action: Action, id: Uuid, reason: &'static str) -> Self {
        Self::InvalidTransition { action, id, reason }
    }
}

impl From<SchemaError> for DomainError {
    fn from(e: SchemaError) -> Self {
        match e {
            SchemaError::NotFound { uid } => Self::SchemaNotFound { uid },
        }
    }
}

impl From<EntityManagerError> for DomainError {
    fn from(e: EntityManagerError) -> Self {
        Self::Storage(e)
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for ContentManagerError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Forbidden => Self::Forbidden,
            DomainError::NotFound { id, .. } => Self::not_found(id),
            DomainError::Validation { field, message } => {
                Self::validation(format!("{field}: {message}"))
            }
            DomainError::SchemaNotFound { uid } => {
                Self::validation(format!("unknown content type: {uid}"))
            }
            transition @ DomainError::InvalidTransition { .. } => {
                Self::validation(transition.to_string())
            }
            DomainError::Storage(_) => Self::Internal,
        }
    }
}
