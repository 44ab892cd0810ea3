//! Local (in-process) client for the content manager.

use std::sync::Arc;

use async_trait::async_trait;
use content_manager_sdk::{
    BulkDeleteInput, BulkDeleteResult, ContentManagerClient, ContentManagerError, Entity,
    EntityQuery, Page, SecurityContext,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{DomainError, Service};

/// Local client wrapping the service.
pub struct ContentManagerLocalClient {
    svc: Arc<Service>,
}

impl ContentManagerLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> ContentManagerError {
    if matches!(e, DomainError::Storage(_)) {
        tracing::error!(operation = op, error = %e, "content_manager call failed");
    } else {
        tracing::debug!(operation = op, error = %e, "content_manager call rejected");
    }
    e.into()
}

#[async_trait]
impl ContentManagerClient for ContentManagerLocalClient {
    async fn find(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        query: EntityQuery,
    ) -> Result<Page<Entity>, ContentManagerError> {
        self.svc
            .find(ctx, uid, query)
            .await
            .map_err(|e| log_and_convert("find", e))
    }

    async fn find_one(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
        query: EntityQuery,
    ) -> Result<Entity, ContentManagerError> {
        self.svc
            .find_one(ctx, uid, id, query)
            .await
            .map_err(|e| log_and_convert("find_one", e))
    }

    async fn create(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        attributes: Map<String, Value>,
    ) -> Result<Entity, ContentManagerError> {
        self.svc
            .create(ctx, uid, attributes)
            .await
            .map_err(|e| log_and_convert("create", e))
    }

    async fn update(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
        attributes: Map<String, Value>,
    ) -> Result<Entity, ContentManagerError> {
        self.svc
            .update(ctx, uid, id, attributes)
            .await
            .map_err(|e| log_and_convert("update", e))
    }

    async fn delete(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<Entity, ContentManagerError> {
        self.svc
            .delete(ctx, uid, id)
            .await
            .map_err(|e| log_and_convert("delete", e))
    }

    async fn publish(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<Entity, ContentManagerError> {
        self.svc
            .publish(ctx, uid, id)
            .await
            .map_err(|e| log_and_convert("publish", e))
    }

    async fn unpublish(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<Entity, ContentManagerError> {
        self.svc
            .unpublish(ctx, uid, id)
            .await
            .map_err(|e| log_and_convert("unpublish", e))
    }

    async fn bulk_delete(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        input: BulkDeleteInput,
        query: EntityQuery,
    ) -> Result<BulkDeleteResult, ContentManagerError> {
        self.svc
            .bulk_delete(ctx, uid, input, query)
            .await
            .map_err(|e| log_and_convert("bulk_delete", e))
    }

    async fn count_draft_relations(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<u64, ContentManagerError> {
        self.svc
            .count_draft_relations(ctx, uid, id)
            .await
            .map_err(|e| log_and_convert("count_draft_relations", e))
    }
}
