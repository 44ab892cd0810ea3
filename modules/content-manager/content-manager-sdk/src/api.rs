//! Public API trait for the content manager.

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::entity::Entity;
use crate::error::ContentManagerError;
use crate::models::{BulkDeleteInput, BulkDeleteResult};
use crate::query::{EntityQuery, Page};
use crate::security::SecurityContext;

/// Public API of the content manager.
///
/// Every call is evaluated against the caller's ability: queries and outputs
/// are reduced to what the caller may see, inputs to what it may write.
///
/// ```ignore
/// let cm: &dyn ContentManagerClient = &local_client;
///
/// let created = cm
///     .create(&ctx, "api::article.article", attributes)
///     .await?;
/// cm.publish(&ctx, "api::article.article", created.id).await?;
/// ```
#[async_trait]
pub trait ContentManagerClient: Send + Sync {
    /// Paged, permission-scoped listing.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not read the content type
    /// - `Validation` if the content type is unknown
    /// - `Internal` on storage failure
    async fn find(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        query: EntityQuery,
    ) -> Result<Page<Entity>, ContentManagerError>;

    /// Single record by id. The query's filters only narrow which related data
    /// is joined for the record check.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not read the content type or the record
    /// - `NotFound` if no record has the id
    /// - `Validation` if the content type is unknown
    /// - `Internal` on storage failure
    async fn find_one(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
        query: EntityQuery,
    ) -> Result<Entity, ContentManagerError>;

    /// # Errors
    ///
    /// - `Forbidden` if the caller may not create records of the content type
    /// - `Validation` if the content type is unknown
    /// - `Internal` on storage failure
    async fn create(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        attributes: Map<String, Value>,
    ) -> Result<Entity, ContentManagerError>;

    /// # Errors
    ///
    /// - `Forbidden` if the caller may not update the content type or the record
    /// - `NotFound` if no record has the id
    /// - `Validation` if the content type is unknown
    /// - `Internal` on storage failure
    async fn update(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
        attributes: Map<String, Value>,
    ) -> Result<Entity, ContentManagerError>;

    /// # Errors
    ///
    /// - `Forbidden` if the caller may not delete the content type or the record
    /// - `NotFound` if no record has the id
    /// - `Validation` if the content type is unknown
    /// - `Internal` on storage failure
    async fn delete(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<Entity, ContentManagerError>;

    /// # Errors
    ///
    /// - `Forbidden` if the caller may not publish the content type or the record
    /// - `NotFound` if no record has the id
    /// - `Validation` if the content type is unknown, has no draft/publish
    ///   workflow, or the record is already published
    /// - `Internal` on storage failure
    async fn publish(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<Entity, ContentManagerError>;

    /// # Errors
    ///
    /// - `Forbidden` if the caller may not unpublish the content type or the record
    /// - `NotFound` if no record has the id
    /// - `Validation` if the content type is unknown, has no draft/publish
    ///   workflow, or the record is already a draft
    /// - `Internal` on storage failure
    async fn unpublish(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<Entity, ContentManagerError>;

    /// Delete the listed records the caller may delete, in one storage call.
    ///
    /// `query` filters narrow the listed ids further; paths the caller may
    /// not delete by are dropped from them.
    ///
    /// # Errors
    ///
    /// - `Validation` if `ids` is empty or too long, or the content type is unknown
    /// - `Forbidden` if the caller may not delete records of the content type
    /// - `Internal` on storage failure
    async fn bulk_delete(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        input: BulkDeleteInput,
        query: EntityQuery,
    ) -> Result<BulkDeleteResult, ContentManagerError>;

    /// Number of draft records related to the given record.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not read the content type or the record
    /// - `NotFound` if no record has the id
    /// - `Validation` if the content type is unknown
    /// - `Internal` on storage failure
    async fn count_draft_relations(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<u64, ContentManagerError>;
}
