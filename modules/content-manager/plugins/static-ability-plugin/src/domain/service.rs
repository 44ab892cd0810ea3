//! Binds the configured grants to a caller.

use std::sync::Arc;

use content_manager_sdk::{AbilityGrant, Predicate, SecurityContext};
use serde_json::Value;
use uuid::Uuid;

use super::ability::StaticAbility;
use crate::config::StaticAbilityPluginConfig;

/// Placeholder replaced with the caller's id in condition values.
pub const SUBJECT_ID_PLACEHOLDER: &str = "$subject_id";

/// Static ability service.
pub struct Service {
    config: StaticAbilityPluginConfig,
}

impl Service {
    #[must_use]
    pub fn new(config: StaticAbilityPluginConfig) -> Self {
        Self { config }
    }

    /// The configured grants with the caller's id substituted into conditions.
    #[must_use]
    pub fn ability_for(&self, subject_id: Uuid) -> StaticAbility {
        let subject = Value::String(subject_id.to_string());
        let grants = self
            .config
            .grants
            .iter()
            .cloned()
            .map(|grant| bind(grant, &subject))
            .collect::<Vec<_>>();
        tracing::debug!(%subject_id, grants = grants.len(), "Built static ability");
        StaticAbility::new(grants)
    }

    /// Security context for `subject_id` carrying its static ability.
    #[must_use]
    pub fn context_for(&self, subject_id: Uuid) -> SecurityContext {
        SecurityContext::builder()
            .subject_id(subject_id)
            .ability(Arc::new(self.ability_for(subject_id)))
            .build()
    }
}

fn bind(mut grant: AbilityGrant, subject: &Value) -> AbilityGrant {
    grant.condition = grant.condition.map(|condition| {
        condition.map_leaves(&mut |predicate: Predicate| Predicate {
            value: substitute(predicate.value, subject),
            ..predicate
        })
    });
    grant
}

fn substitute(value: Value, subject: &Value) -> Value {
    match value {
        Value::String(s) if s == SUBJECT_ID_PLACEHOLDER => subject.clone(),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| substitute(item, subject))
                .collect(),
        ),
        other => other,
    }
}
