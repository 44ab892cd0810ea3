use content_manager_sdk::{
    Action, AuditStamp, ContentTypeSchema, Entity, EntityQuery, Filter, FindOneOptions, Page,
    PopulateSpec, SecurityContext, events,
};
use futures::future::join_all;
use serde_json::{Map, Value, json};
use tracing::instrument;
use uuid::Uuid;

use super::{Service, ensure};
use crate::domain::error::DomainError;
use crate::domain::populate;
use crate::domain::sanitize::{InputPipeline, PermittedFields, WritableAttributes, WriteMode};

impl Service {
    /// Paged listing scoped to what the caller may read.
    ///
    /// # Errors
    ///
    /// - [`DomainError::SchemaNotFound`] for an unknown content type
    /// - [`DomainError::Forbidden`] without read access to the content type
    /// - [`DomainError::Storage`] on entity manager failure
    #[instrument(skip(self, ctx, query), fields(uid = %uid))]
    pub async fn find(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        query: EntityQuery,
    ) -> Result<Page<Entity>, DomainError> {
        let schema = self.schema(uid)?;
        let checker = self.checker(ctx, &schema);
        ensure(checker.can(Action::Read), Action::Read, uid)?;

        let mut query = checker.scoped_query(Action::Read, query);
        query.pagination = self.config.clamp_pagination(query.pagination);

        let Page {
            results,
            pagination,
        } = self.entities.find_page(&query, uid).await?;

        let checker = &checker;
        let results = join_all(
            results
                .into_iter()
                .map(|entity| async move { checker.sanitize_output(entity) }),
        )
        .await;

        tracing::debug!(count = results.len(), "Listed entries");
        Ok(Page {
            results,
            pagination,
        })
    }

    /// Single entry by id.
    ///
    /// The query's filters are not applied to the lookup; they decide which
    /// related data is populated for the record-level check.
    ///
    /// # Errors
    ///
    /// - [`DomainError::SchemaNotFound`] for an unknown content type
    /// - [`DomainError::Forbidden`] without read access to the type or the entry
    /// - [`DomainError::NotFound`] if no entry has the id
    /// - [`DomainError::Storage`] on entity manager failure
    #[instrument(skip(self, ctx, query), fields(uid = %uid, id = %id))]
    pub async fn find_one(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
        query: EntityQuery,
    ) -> Result<Entity, DomainError> {
        let schema = self.schema(uid)?;
        let checker = self.checker(ctx, &schema);
        ensure(checker.can(Action::Read), Action::Read, uid)?;

        let query = checker.sanitize_query(Action::Read, query);
        let populate = self.read_population(ctx, &schema, query.filters.as_ref());

        let entity = self
            .fetch(uid, id, &FindOneOptions::with_counts(populate))
            .await?;
        ensure(checker.can_record(Action::Read, &entity), Action::Read, uid)?;

        Ok(checker.sanitize_output(entity))
    }

    /// # Errors
    ///
    /// - [`DomainError::SchemaNotFound`] for an unknown content type
    /// - [`DomainError::Forbidden`] without create access to the content type
    /// - [`DomainError::Storage`] on entity manager failure
    #[instrument(skip(self, ctx, attributes), fields(uid = %uid))]
    pub async fn create(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        attributes: Map<String, Value>,
    ) -> Result<Entity, DomainError> {
        let schema = self.schema(uid)?;
        let checker = self.checker(ctx, &schema);
        ensure(checker.can(Action::Create), Action::Create, uid)?;

        let existing = self.entities.count(uid).await?;

        let input = {
            let writable = WritableAttributes::new(&schema);
            let permitted = PermittedFields::new(&checker, WriteMode::Create);
            InputPipeline::new(&writable, &permitted)
                .run(attributes, &AuditStamp::creator(ctx.subject_id()))
        };

        let created = self.entities.create(input, uid).await?;
        tracing::info!(id = %created.id, "Created entry");

        if existing == 0 {
            self.telemetry.emit(
                events::DID_CREATE_FIRST_ENTRY,
                json!({ "eventProperties": { "model": uid } }),
            );
        }

        Ok(checker.sanitize_output(created))
    }

    /// # Errors
    ///
    /// - [`DomainError::SchemaNotFound`] for an unknown content type
    /// - [`DomainError::Forbidden`] without update access to the type or the entry
    /// - [`DomainError::NotFound`] if no entry has the id
    /// - [`DomainError::Storage`] on entity manager failure
    #[instrument(skip(self, ctx, attributes), fields(uid = %uid, id = %id))]
    pub async fn update(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
        attributes: Map<String, Value>,
    ) -> Result<Entity, DomainError> {
        let schema = self.schema(uid)?;
        let checker = self.checker(ctx, &schema);
        ensure(checker.can(Action::Update), Action::Update, uid)?;

        let existing = self.fetch(uid, id, &FindOneOptions::default()).await?;
        ensure(
            checker.can_record(Action::Update, &existing),
            Action::Update,
            uid,
        )?;

        let input = {
            let writable = WritableAttributes::new(&schema);
            let permitted = PermittedFields::new(&checker, WriteMode::Update(&existing));
            InputPipeline::new(&writable, &permitted)
                .run(attributes, &AuditStamp::editor(ctx.subject_id()))
        };

        let updated = self.entities.update(&existing, input, uid).await?;
        tracing::info!("Updated entry");

        Ok(checker.sanitize_output(updated))
    }

    /// Returns the deleted entry as the caller may read it.
    ///
    /// # Errors
    ///
    /// - [`DomainError::SchemaNotFound`] for an unknown content type
    /// - [`DomainError::Forbidden`] without delete access to the type or the entry
    /// - [`DomainError::NotFound`] if no entry has the id
    /// - [`DomainError::Storage`] on entity manager failure
    #[instrument(skip(self, ctx), fields(uid = %uid, id = %id))]
    pub async fn delete(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        id: Uuid,
    ) -> Result<Entity, DomainError> {
        let schema = self.schema(uid)?;
        let checker = self.checker(ctx, &schema);
        ensure(checker.can(Action::Delete), Action::Delete, uid)?;

        let existing = self.fetch(uid, id, &FindOneOptions::default()).await?;
        ensure(
            checker.can_record(Action::Delete, &existing),
            Action::Delete,
            uid,
        )?;

        let deleted = self.entities.delete(&existing, uid).await?;
        tracing::info!("Deleted entry");

        Ok(checker.sanitize_output(deleted))
    }

    /// Population needed to evaluate `filter`, widened with the paths read by
    /// the caller's read conditions when configured.
    fn read_population(
        &self,
        ctx: &SecurityContext,
        schema: &ContentTypeSchema,
        filter: Option<&Filter>,
    ) -> PopulateSpec {
        let registry = self.schemas.as_ref();
        let populate = filter
            .map(|filter| populate::derive(filter, schema, registry))
            .unwrap_or_default();

        if !self.config.populate_condition_paths {
            return populate;
        }
        ctx.ability()
            .conditions(Action::Read, schema.uid())
            .iter()
            .fold(populate, |acc, condition| {
                acc.merge(populate::derive(condition, schema, registry))
            })
    }
}
