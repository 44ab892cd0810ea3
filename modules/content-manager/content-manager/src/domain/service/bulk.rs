use content_manager_sdk::{
    Action, BulkDeleteInput, BulkDeleteResult, EntityQuery, Filter, SecurityContext,
    system_attributes,
};
use tracing::instrument;

use super::{Service, ensure};
use crate::domain::error::DomainError;
use crate::domain::validation::validate_bulk_delete;

impl Service {
    /// Delete the listed entries the caller may delete, in one storage call.
    ///
    /// `query` narrows the id set further once reduced to the paths the
    /// caller may delete by. Ids outside the caller's delete conditions are
    /// left alone and not counted.
    ///
    /// # Errors
    ///
    /// - [`DomainError::SchemaNotFound`] for an unknown content type
    /// - [`DomainError::Validation`] if the id list is empty or too long
    /// - [`DomainError::Forbidden`] without delete access to the content type
    /// - [`DomainError::Storage`] on entity manager failure
    #[instrument(skip(self, ctx, input, query), fields(uid = %uid, ids = input.ids.len()))]
    pub async fn bulk_delete(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        input: BulkDeleteInput,
        query: EntityQuery,
    ) -> Result<BulkDeleteResult, DomainError> {
        let schema = self.schema(uid)?;
        validate_bulk_delete(&input, self.config.max_bulk_delete_ids)?;

        let checker = self.checker(ctx, &schema);
        ensure(checker.can(Action::Delete), Action::Delete, uid)?;

        let ids = Filter::is_in(
            system_attributes::ID,
            input.ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
        );
        let mut query = checker.scoped_query(Action::Delete, query);
        query.filters = Some(match query.filters.take() {
            Some(narrowing) => Filter::and([ids, narrowing]),
            None => Filter::and([ids]),
        });

        let count = self.entities.delete_many(&query, uid).await?;
        tracing::info!(count, "Bulk deleted entries");

        Ok(BulkDeleteResult { count })
    }
}
