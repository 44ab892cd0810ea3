use content_manager_sdk::{
    Action, AuditStamp, Entity, FindOneOptions, PopulateSpec, SecurityContext,
};
use tracing::instrument;
use uuid::Uuid;

use super::{Service, ensure};
use crate::domain::error::DomainError;

impl Service {
    /// Move a draft entry to the published state.
    ///
    /// # Errors
    ///
    /// - [`DomainError::SchemaNotFound`] for an unknown content type
    /// - [`DomainError::Forbidden`] without publish access to the type or the entry
    /// - [`DomainError::NotFound`] if no entry has the id
    /// - [`DomainError::InvalidTransition`] if the type has no draft and publish
    ///   workflow or the entry is already published
    /// - [`DomainError::Storage`] on entity manager failure
    #[instrument(skip(self, ctx), fields(uid = %uid, id = %id))]
    pub async fn publish(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<Entity, DomainError> {
        self.transition(ctx, uid, id, Action::Publish).await
    }

    /// Move a published entry back to draft.
    ///
    /// # Errors
    ///
    /// - [`DomainError::SchemaNotFound`] for an unknown content type
    /// - [`DomainError::Forbidden`] without unpublish access to the type or the entry
    /// - [`DomainError::NotFound`] if no entry has the id
    /// - [`DomainError::InvalidTransition`] if the type has no draft and publish
    ///   workflow or the entry is already a draft
    /// - [`DomainError::Storage`] on entity manager failure
    #[instrument(skip(self, ctx), fields(uid = %uid, id = %id))]
    pub async fn unpublish(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<Entity, DomainError> {
        self.transition(ctx, uid, id, Action::Unpublish).await
    }

    /// Number of draft entries related to the entry.
    ///
    /// # Errors
    ///
    /// - [`DomainError::SchemaNotFound`] for an unknown content type
    /// - [`DomainError::Forbidden`] without read access to the type or the entry
    /// - [`DomainError::NotFound`] if no entry has the id
    /// - [`DomainError::Storage`] on entity manager failure
    #[instrument(skip(self, ctx), fields(uid = %uid, id = %id))]
    pub async fn count_draft_relations(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<u64, DomainError> {
        let schema = self.schema(uid)?;
        let checker = self.checker(ctx, &schema);
        ensure(checker.can(Action::Read), Action::Read, uid)?;

        let entity = self
            .fetch(uid, id, &FindOneOptions::with_counts(PopulateSpec::new()))
            .await?;
        ensure(checker.can_record(Action::Read, &entity), Action::Read, uid)?;

        Ok(self.entities.count_draft_relations(id, uid).await?)
    }

    async fn transition(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
        action: Action,
    ) -> Result<Entity, DomainError> {
        let schema = self.schema(uid)?;
        let checker = self.checker(ctx, &schema);
        ensure(checker.can(action), action, uid)?;

        let existing = self.fetch(uid, id, &FindOneOptions::default()).await?;
        ensure(checker.can_record(action, &existing), action, uid)?;

        if !schema.has_draft_and_publish() {
            return Err(DomainError::invalid_transition(
                action,
                id,
                "content type has no draft and publish",
            ));
        }

        let stamp = AuditStamp::editor(ctx.subject_id());
        let entity = if action == Action::Publish {
            if !existing.is_draft() {
                return Err(DomainError::invalid_transition(action, id, "already published"));
            }
            self.entities.publish(&existing, &stamp, uid).await?
        } else {
            if existing.is_draft() {
                return Err(DomainError::invalid_transition(action, id, "already a draft"));
            }
            self.entities.unpublish(&existing, &stamp, uid).await?
        };
        tracing::info!(action = action.name(), "Changed publication state");

        Ok(checker.sanitize_output(entity))
    }
}
