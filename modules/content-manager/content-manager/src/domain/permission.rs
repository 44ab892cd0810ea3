//! Permission checks and field-level sanitization for one content type.
//!
//! A [`PermissionChecker`] is built per request from the caller's ability and
//! the schema of the content type being accessed. Checks never fail: they
//! answer `true`/`false` or return the input with disallowed parts removed.
//!
//! Field sets are resolved per schema boundary:
//! - inside a component, paths are checked against the parent's field set as
//!   dotted paths (`seo.title`);
//! - crossing a relation or media attribute switches to the target content
//!   type's own read grants;
//! - dynamic zones and polymorphic relations have no static target and are
//!   never traversed by queries.

use std::sync::Arc;

use content_manager_sdk::{
    Ability, Action, AttributeKind, AttributePath, ContentTypeSchema, Entity, EntityQuery,
    FieldSet, Filter, MEDIA_UID, RelationTarget, SchemaRegistry, system_attributes,
};
use serde_json::{Map, Value};

pub struct PermissionChecker<'a> {
    ability: &'a dyn Ability,
    schema: &'a ContentTypeSchema,
    registry: &'a dyn SchemaRegistry,
}

impl<'a> PermissionChecker<'a> {
    #[must_use]
    pub fn new(
        ability: &'a dyn Ability,
        schema: &'a ContentTypeSchema,
        registry: &'a dyn SchemaRegistry,
    ) -> Self {
        Self {
            ability,
            schema,
            registry,
        }
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        self.schema.uid()
    }

    /// Collection-level check.
    #[must_use]
    pub fn can(&self, action: Action) -> bool {
        self.ability.can(action, self.uid())
    }

    #[must_use]
    pub fn cannot(&self, action: Action) -> bool {
        !self.can(action)
    }

    /// Record-level check against a fetched entry.
    #[must_use]
    pub fn can_record(&self, action: Action, entity: &Entity) -> bool {
        self.ability.can_record(action, self.uid(), entity)
    }

    /// Remove filter leaves, sort keys and selected fields the action does not
    /// cover. Combinators emptied by the removal disappear with them.
    #[must_use]
    pub fn sanitize_query(&self, action: Action, query: EntityQuery) -> EntityQuery {
        let fields = self.ability.permitted_fields(action, self.uid(), None);
        let allowed = |segments: &[String]| self.path_allowed(self.schema, &fields, segments);

        let EntityQuery {
            filters,
            sort,
            fields: selection,
            pagination,
        } = query;

        let filters = filters.and_then(|filter| {
            filter.retain_leaves(&mut |predicate| allowed(predicate.path.segments()))
        });
        let sort = sort
            .into_iter()
            .filter(|key| allowed(key.path.segments()))
            .collect();
        let selection = selection.map(|selection| {
            selection
                .into_iter()
                .filter(|field| allowed(AttributePath::parse(field).segments()))
                .collect()
        });

        EntityQuery {
            filters,
            sort,
            fields: selection,
            pagination,
        }
    }

    /// Sanitized query narrowed to the records the action's grants reach.
    ///
    /// Conditional grants contribute their conditions as one `or` clause; when
    /// some grant is unconditional the query is left unrestricted.
    #[must_use]
    pub fn scoped_query(&self, action: Action, query: EntityQuery) -> EntityQuery {
        let mut query = self.sanitize_query(action, query);
        let conditions = self.ability.conditions(action, self.uid());
        if !conditions.is_empty() {
            let scope = Filter::Or(conditions);
            query.filters = Some(match query.filters.take() {
                Some(filters) => Filter::and([filters, scope]),
                None => scope,
            });
        }
        query
    }

    /// Reduce an entry to what the caller may read.
    #[must_use]
    pub fn sanitize_output(&self, entity: Entity) -> Entity {
        let fields = self
            .ability
            .permitted_fields(Action::Read, self.uid(), Some(&entity));
        let Entity {
            id,
            attributes,
            published_at,
        } = entity;

        Entity {
            id,
            attributes: self.filter_output(self.schema, &fields, attributes),
            published_at,
        }
    }

    /// Reduce create input to the fields the caller may create.
    #[must_use]
    pub fn sanitize_create_input(&self, input: Map<String, Value>) -> Map<String, Value> {
        let fields = self.ability.permitted_fields(Action::Create, self.uid(), None);
        self.filter_input(self.schema, &fields, input)
    }

    /// Input filter for updating `existing`: only grants whose condition holds
    /// for the existing entry contribute fields.
    #[must_use]
    pub fn sanitize_update_input(
        &self,
        existing: &Entity,
    ) -> impl Fn(Map<String, Value>) -> Map<String, Value> + '_ {
        let fields = self
            .ability
            .permitted_fields(Action::Update, self.uid(), Some(existing));
        move |input| self.filter_input(self.schema, &fields, input)
    }

    fn resolve(&self, uid: &str) -> Option<Arc<ContentTypeSchema>> {
        match self.registry.schema_of(uid) {
            Ok(schema) => Some(schema),
            Err(e) => {
                tracing::debug!(error = %e, "Target schema missing, stripping path");
                None
            }
        }
    }

    // ── query paths ──────────────────────────────────────────────────────

    fn path_allowed(
        &self,
        schema: &ContentTypeSchema,
        fields: &FieldSet,
        segments: &[String],
    ) -> bool {
        let Some((head, rest)) = segments.split_first() else {
            return false;
        };
        let Some(attribute) = schema.attribute(head) else {
            return false;
        };

        match &attribute.kind {
            AttributeKind::Scalar => {
                rest.is_empty() && (head == system_attributes::ID || fields.permits(head))
            }
            AttributeKind::Component { component, .. } => {
                if rest.is_empty() {
                    return fields.permits_any_under(head);
                }
                self.resolve(component).is_some_and(|target| {
                    self.path_allowed(&target, &fields.nested(head), rest)
                })
            }
            AttributeKind::Relation(RelationTarget::Fixed(target)) => {
                fields.permits(head) && self.crosses_into(target, rest)
            }
            AttributeKind::Media => fields.permits(head) && self.crosses_into(MEDIA_UID, rest),
            AttributeKind::Relation(RelationTarget::Polymorphic)
            | AttributeKind::DynamicZone { .. } => false,
        }
    }

    fn crosses_into(&self, target: &str, rest: &[String]) -> bool {
        if rest.is_empty() {
            return true;
        }
        if !self.ability.can(Action::Read, target) {
            return false;
        }
        let target_fields = self.ability.permitted_fields(Action::Read, target, None);
        self.resolve(target)
            .is_some_and(|schema| self.path_allowed(&schema, &target_fields, rest))
    }

    // ── output ───────────────────────────────────────────────────────────

    fn filter_output(
        &self,
        schema: &ContentTypeSchema,
        fields: &FieldSet,
        attributes: Map<String, Value>,
    ) -> Map<String, Value> {
        attributes
            .into_iter()
            .filter_map(|(name, value)| {
                if is_identity_key(&name) {
                    return Some((name, value));
                }
                let value = match schema.attribute(&name).map(|a| &a.kind) {
                    // undeclared keys (timestamps and the like) behave as scalars
                    None | Some(AttributeKind::Scalar) => fields.permits(&name).then_some(value),
                    Some(AttributeKind::Component { component, .. }) => {
                        if !fields.permits_any_under(&name) {
                            return None;
                        }
                        let target = self.resolve(component)?;
                        let nested = fields.nested(&name);
                        Some(map_objects(value, |obj| {
                            Some(self.filter_output(&target, &nested, obj))
                        }))
                    }
                    Some(AttributeKind::DynamicZone { components }) => {
                        if !fields.permits_any_under(&name) {
                            return None;
                        }
                        let nested = fields.nested(&name);
                        Some(map_objects(value, |entry| {
                            let target = self.zone_component(components, &entry)?;
                            Some(self.filter_output(&target, &nested, entry))
                        }))
                    }
                    Some(AttributeKind::Relation(RelationTarget::Fixed(target))) => fields
                        .permits(&name)
                        .then(|| self.filter_relation(target, value)),
                    Some(AttributeKind::Media) => fields
                        .permits(&name)
                        .then(|| self.filter_relation(MEDIA_UID, value)),
                    Some(AttributeKind::Relation(RelationTarget::Polymorphic)) => {
                        fields.permits(&name).then(|| {
                            map_objects(value, |entry| {
                                let target = entry
                                    .get(system_attributes::TYPE)
                                    .and_then(Value::as_str)
                                    .map(str::to_owned);
                                Some(match target {
                                    Some(target) => self.filter_related(&target, entry),
                                    None => id_reference(entry),
                                })
                            })
                        })
                    }
                }?;
                Some((name, value))
            })
            .collect()
    }

    /// Populated relation value: the target's read set applies, or the value
    /// collapses to id references when the target is not readable.
    fn filter_relation(&self, target: &str, value: Value) -> Value {
        map_objects(value, |entry| Some(self.filter_related(target, entry)))
    }

    fn filter_related(&self, target: &str, entry: Map<String, Value>) -> Map<String, Value> {
        if !self.ability.can(Action::Read, target) {
            return id_reference(entry);
        }
        let Some(schema) = self.resolve(target) else {
            return id_reference(entry);
        };
        let fields = self.ability.permitted_fields(Action::Read, target, None);
        self.filter_output(&schema, &fields, entry)
    }

    fn zone_component(
        &self,
        allowed: &[String],
        entry: &Map<String, Value>,
    ) -> Option<Arc<ContentTypeSchema>> {
        let component = entry.get(system_attributes::COMPONENT)?.as_str()?;
        if !allowed.iter().any(|c| c == component) {
            return None;
        }
        self.resolve(component)
    }

    // ── input ────────────────────────────────────────────────────────────

    fn filter_input(
        &self,
        schema: &ContentTypeSchema,
        fields: &FieldSet,
        input: Map<String, Value>,
    ) -> Map<String, Value> {
        input
            .into_iter()
            .filter_map(|(name, value)| {
                if name == system_attributes::COMPONENT {
                    return Some((name, value));
                }
                let value = match &schema.attribute(&name)?.kind {
                    AttributeKind::Scalar
                    | AttributeKind::Media
                    | AttributeKind::Relation(_) => fields.permits(&name).then_some(value),
                    AttributeKind::Component { component, .. } => {
                        if !fields.permits_any_under(&name) {
                            return None;
                        }
                        let target = self.resolve(component)?;
                        let nested = fields.nested(&name);
                        Some(map_objects(value, |obj| {
                            Some(self.filter_input(&target, &nested, obj))
                        }))
                    }
                    AttributeKind::DynamicZone { components } => {
                        if !fields.permits_any_under(&name) {
                            return None;
                        }
                        let nested = fields.nested(&name);
                        Some(map_objects(value, |entry| {
                            let target = self.zone_component(components, &entry)?;
                            Some(self.filter_input(&target, &nested, entry))
                        }))
                    }
                }?;
                Some((name, value))
            })
            .collect()
    }
}

fn is_identity_key(name: &str) -> bool {
    name == system_attributes::ID
        || name == system_attributes::COMPONENT
        || name == system_attributes::TYPE
}

/// Apply `f` to an object, or to every object of an array. Array entries for
/// which `f` returns `None` are dropped; other values pass through.
fn map_objects<F>(value: Value, mut f: F) -> Value
where
    F: FnMut(Map<String, Value>) -> Option<Map<String, Value>>,
{
    match value {
        Value::Object(obj) => f(obj).map_or(Value::Null, Value::Object),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(obj) => f(obj).map(Value::Object),
                    other => Some(other),
                })
                .collect(),
        ),
        other => other,
    }
}

fn id_reference(entry: Map<String, Value>) -> Map<String, Value> {
    entry
        .into_iter()
        .filter(|(name, _)| is_identity_key(name))
        .collect()
}
