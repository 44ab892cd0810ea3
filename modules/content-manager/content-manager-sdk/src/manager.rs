//! Storage-facing contract.
//!
//! The entity manager owns persistence. The content manager hands it
//! already-sanitized queries and inputs and never talks to storage directly.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::audit::AuditStamp;
use crate::entity::{Entity, FindOneOptions};
use crate::query::{EntityQuery, Page};

/// Write payload that went through input sanitization.
///
/// Values are built by the content manager's input pipeline. The only
/// constructor applies the audit stamp last, so a value of this type always
/// carries the caller's audit attributes. Entity managers receive it and
/// never build one.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedInput(Map<String, Value>);

impl SanitizedInput {
    /// Used by the input pipeline; not part of the public API.
    #[doc(hidden)]
    #[must_use]
    pub fn stamped(mut attributes: Map<String, Value>, stamp: &AuditStamp) -> Self {
        stamp.apply(&mut attributes);
        Self(attributes)
    }

    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_attributes(self) -> Map<String, Value> {
        self.0
    }
}

/// Errors reported by an entity manager.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityManagerError {
    /// The backing store could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The store refused the write (constraint violation, conflict, ...).
    #[error("storage rejected the request: {0}")]
    Rejected(String),

    #[error("internal storage error: {0}")]
    Internal(String),
}

/// Persistence operations on records of any content type.
#[async_trait]
pub trait EntityManager: Send + Sync {
    /// Page of records matching the query.
    ///
    /// # Errors
    ///
    /// Returns [`EntityManagerError`] on storage failure.
    async fn find_page(&self, query: &EntityQuery, uid: &str)
    -> Result<Page<Entity>, EntityManagerError>;

    /// Single record, with the requested relations populated.
    ///
    /// # Errors
    ///
    /// Returns [`EntityManagerError`] on storage failure.
    async fn find_one(
        &self,
        id: Uuid,
        uid: &str,
        options: &FindOneOptions,
    ) -> Result<Option<Entity>, EntityManagerError>;

    /// Number of records of the content type.
    ///
    /// # Errors
    ///
    /// Returns [`EntityManagerError`] on storage failure.
    async fn count(&self, uid: &str) -> Result<u64, EntityManagerError>;

    /// # Errors
    ///
    /// Returns [`EntityManagerError`] on storage failure.
    async fn create(&self, input: SanitizedInput, uid: &str) -> Result<Entity, EntityManagerError>;

    /// # Errors
    ///
    /// Returns [`EntityManagerError`] on storage failure.
    async fn update(
        &self,
        existing: &Entity,
        input: SanitizedInput,
        uid: &str,
    ) -> Result<Entity, EntityManagerError>;

    /// Delete the record and return it as it was.
    ///
    /// # Errors
    ///
    /// Returns [`EntityManagerError`] on storage failure.
    async fn delete(&self, existing: &Entity, uid: &str) -> Result<Entity, EntityManagerError>;

    /// Delete every record matching the query filters in one operation.
    ///
    /// # Errors
    ///
    /// Returns [`EntityManagerError`] on storage failure.
    async fn delete_many(&self, query: &EntityQuery, uid: &str) -> Result<u64, EntityManagerError>;

    /// # Errors
    ///
    /// Returns [`EntityManagerError`] on storage failure.
    async fn publish(
        &self,
        existing: &Entity,
        stamp: &AuditStamp,
        uid: &str,
    ) -> Result<Entity, EntityManagerError>;

    /// # Errors
    ///
    /// Returns [`EntityManagerError`] on storage failure.
    async fn unpublish(
        &self,
        existing: &Entity,
        stamp: &AuditStamp,
        uid: &str,
    ) -> Result<Entity, EntityManagerError>;

    /// Number of draft records the given record relates to.
    ///
    /// # Errors
    ///
    /// Returns [`EntityManagerError`] on storage failure.
    async fn count_draft_relations(&self, id: Uuid, uid: &str) -> Result<u64, EntityManagerError>;
}
