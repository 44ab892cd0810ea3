//! In-memory [`EntityManager`] for tests and local development.
//!
//! Records are kept per content type in insertion order. Populated relations
//! are whatever nested JSON the seeded records carry. Every call is recorded so
//! tests can assert that storage was or was not reached.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::audit::AuditStamp;
use crate::entity::{Entity, FindOneOptions};
use crate::manager::{EntityManager, EntityManagerError, SanitizedInput};
use crate::query::{EntityQuery, Page, PageInfo};

const FALLBACK_PAGE_SIZE: u64 = 10;

#[derive(Default)]
struct State {
    records: HashMap<String, Vec<Entity>>,
    calls: Vec<&'static str>,
    last_query: Option<EntityQuery>,
    last_find_one: Option<FindOneOptions>,
    last_input: Option<SanitizedInput>,
    draft_relations: HashMap<Uuid, u64>,
    failure: Option<EntityManagerError>,
}

#[derive(Default)]
pub struct InMemoryEntityManager {
    state: Mutex<State>,
}

impl InMemoryEntityManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entity(self, uid: &str, entity: Entity) -> Self {
        self.seed(uid, entity);
        self
    }

    pub fn seed(&self, uid: &str, entity: Entity) {
        self.state
            .lock()
            .records
            .entry(uid.to_owned())
            .or_default()
            .push(entity);
    }

    /// Make every following call fail with `error`.
    pub fn fail_with(&self, error: EntityManagerError) {
        self.state.lock().failure = Some(error);
    }

    pub fn set_draft_relations(&self, id: Uuid, count: u64) {
        self.state.lock().draft_relations.insert(id, count);
    }

    /// Names of the trait methods called so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state.lock().calls.contains(&method)
    }

    /// Query passed to the most recent `find_page` or `delete_many`.
    #[must_use]
    pub fn last_query(&self) -> Option<EntityQuery> {
        self.state.lock().last_query.clone()
    }

    #[must_use]
    pub fn last_find_one(&self) -> Option<FindOneOptions> {
        self.state.lock().last_find_one.clone()
    }

    /// Input passed to the most recent `create` or `update`.
    #[must_use]
    pub fn last_input(&self) -> Option<SanitizedInput> {
        self.state.lock().last_input.clone()
    }

    #[must_use]
    pub fn entities(&self, uid: &str) -> Vec<Entity> {
        self.state
            .lock()
            .records
            .get(uid)
            .cloned()
            .unwrap_or_default()
    }

    fn enter(
        &self,
        method: &'static str,
    ) -> Result<parking_lot::MutexGuard<'_, State>, EntityManagerError> {
        let mut state = self.state.lock();
        state.calls.push(method);
        match state.failure.clone() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

fn replace(state: &mut State, uid: &str, entity: Entity) -> Result<Entity, EntityManagerError> {
    let slot = state
        .records
        .get_mut(uid)
        .and_then(|records| records.iter_mut().find(|r| r.id == entity.id))
        .ok_or_else(|| EntityManagerError::Rejected(format!("no record {}", entity.id)))?;
    *slot = entity.clone();
    Ok(entity)
}

fn to_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[async_trait]
impl EntityManager for InMemoryEntityManager {
    async fn find_page(
        &self,
        query: &EntityQuery,
        uid: &str,
    ) -> Result<Page<Entity>, EntityManagerError> {
        let mut state = self.enter("find_page")?;
        state.last_query = Some(query.clone());

        let matched: Vec<Entity> = state
            .records
            .get(uid)
            .into_iter()
            .flatten()
            .filter(|entity| {
                query
                    .filters
                    .as_ref()
                    .is_none_or(|filter| filter.matches(&entity.as_record()))
            })
            .cloned()
            .collect();

        let page = query.pagination.page.max(1);
        let page_size = query.pagination.page_size.unwrap_or(FALLBACK_PAGE_SIZE);
        let total = to_u64(matched.len());
        let results = matched
            .into_iter()
            .skip(to_usize((page - 1).saturating_mul(page_size)))
            .take(to_usize(page_size))
            .collect();

        Ok(Page {
            results,
            pagination: PageInfo::new(page, page_size, total),
        })
    }

    async fn find_one(
        &self,
        id: Uuid,
        uid: &str,
        options: &FindOneOptions,
    ) -> Result<Option<Entity>, EntityManagerError> {
        let mut state = self.enter("find_one")?;
        state.last_find_one = Some(options.clone());
        Ok(state
            .records
            .get(uid)
            .and_then(|records| records.iter().find(|entity| entity.id == id))
            .cloned())
    }

    async fn count(&self, uid: &str) -> Result<u64, EntityManagerError> {
        let state = self.enter("count")?;
        Ok(state.records.get(uid).map_or(0, |records| to_u64(records.len())))
    }

    async fn create(&self, input: SanitizedInput, uid: &str) -> Result<Entity, EntityManagerError> {
        let mut state = self.enter("create")?;
        state.last_input = Some(input.clone());
        let entity = Entity::new(Uuid::new_v4(), input.into_attributes());
        state
            .records
            .entry(uid.to_owned())
            .or_default()
            .push(entity.clone());
        Ok(entity)
    }

    async fn update(
        &self,
        existing: &Entity,
        input: SanitizedInput,
        uid: &str,
    ) -> Result<Entity, EntityManagerError> {
        let mut state = self.enter("update")?;
        state.last_input = Some(input.clone());
        let mut updated = existing.clone();
        updated.attributes.extend(input.into_attributes());
        replace(&mut state, uid, updated)
    }

    async fn delete(&self, existing: &Entity, uid: &str) -> Result<Entity, EntityManagerError> {
        let mut state = self.enter("delete")?;
        if let Some(records) = state.records.get_mut(uid) {
            records.retain(|entity| entity.id != existing.id);
        }
        Ok(existing.clone())
    }

    async fn delete_many(&self, query: &EntityQuery, uid: &str) -> Result<u64, EntityManagerError> {
        let mut state = self.enter("delete_many")?;
        state.last_query = Some(query.clone());
        let Some(records) = state.records.get_mut(uid) else {
            return Ok(0);
        };
        let before = records.len();
        records.retain(|entity| {
            !query
                .filters
                .as_ref()
                .is_none_or(|filter| filter.matches(&entity.as_record()))
        });
        Ok(to_u64(before - records.len()))
    }

    async fn publish(
        &self,
        existing: &Entity,
        stamp: &AuditStamp,
        uid: &str,
    ) -> Result<Entity, EntityManagerError> {
        let mut state = self.enter("publish")?;
        let mut published = existing.clone();
        published.published_at = Some(stamp.at());
        stamp.apply(&mut published.attributes);
        replace(&mut state, uid, published)
    }

    async fn unpublish(
        &self,
        existing: &Entity,
        stamp: &AuditStamp,
        uid: &str,
    ) -> Result<Entity, EntityManagerError> {
        let mut state = self.enter("unpublish")?;
        let mut draft = existing.clone();
        draft.published_at = None;
        stamp.apply(&mut draft.attributes);
        replace(&mut state, uid, draft)
    }

    async fn count_draft_relations(&self, id: Uuid, _uid: &str) -> Result<u64, EntityManagerError> {
        let state = self.enter("count_draft_relations")?;
        Ok(state.draft_relations.get(&id).copied().unwrap_or_default())
    }
}
