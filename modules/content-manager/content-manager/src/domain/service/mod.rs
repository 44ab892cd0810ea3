//! Request orchestration.
//!
//! ## Flow
//!
//! Every operation resolves the content type schema first, then runs the
//! collection-level check for its action before touching storage. Operations
//! on a single entry fetch it, run the record-level check against the fetched
//! entry, and only then call the mutating entity manager method. Outputs are
//! always reduced to the caller's read grants.
//!
//! Submodules:
//! - `entries` - find, find one, create, update, delete
//! - `publication` - publish, unpublish, draft relation counts
//! - `bulk` - bulk delete
//!
//! The service holds no per-request state; concurrent requests share nothing
//! but the collaborators behind `Arc`s.

use std::sync::Arc;

use content_manager_sdk::{
    Action, ContentTypeSchema, Entity, EntityManager, FindOneOptions, SchemaRegistry,
    SecurityContext, TelemetrySink,
};
use uuid::Uuid;

use crate::config::ContentManagerConfig;
use crate::domain::error::DomainError;
use crate::domain::permission::PermissionChecker;

mod bulk;
mod entries;
mod publication;

#[cfg(test)]
mod tests_access;

#[cfg(test)]
mod tests_workflow;

/// Content manager domain service.
pub struct Service {
    schemas: Arc<dyn SchemaRegistry>,
    entities: Arc<dyn EntityManager>,
    telemetry: Arc<dyn TelemetrySink>,
    config: ContentManagerConfig,
}

impl Service {
    #[must_use]
    pub fn new(
        schemas: Arc<dyn SchemaRegistry>,
        entities: Arc<dyn EntityManager>,
        telemetry: Arc<dyn TelemetrySink>,
        config: ContentManagerConfig,
    ) -> Self {
        Self {
            schemas,
            entities,
            telemetry,
            config,
        }
    }

    fn schema(&self, uid: &str) -> Result<Arc<ContentTypeSchema>, DomainError> {
        Ok(self.schemas.schema_of(uid)?)
    }

    fn checker<'a>(
        &'a self,
        ctx: &'a SecurityContext,
        schema: &'a ContentTypeSchema,
    ) -> PermissionChecker<'a> {
        PermissionChecker::new(ctx.ability(), schema, self.schemas.as_ref())
    }

    async fn fetch(
        &self,
        uid: &str,
        id: Uuid,
        options: &FindOneOptions,
    ) -> Result<Entity, DomainError> {
        self.entities
            .find_one(id, uid, options)
            .await?
            .ok_or_else(|| {
                tracing::debug!(uid, %id, "Entry not found");
                DomainError::not_found(uid, id)
            })
    }
}

/// Turn a failed check into `Forbidden`.
fn ensure(allowed: bool, action: Action, uid: &str) -> Result<(), DomainError> {
    if allowed {
        Ok(())
    } else {
        tracing::debug!(action = action.name(), uid, "Access denied");
        Err(DomainError::Forbidden)
    }
}
