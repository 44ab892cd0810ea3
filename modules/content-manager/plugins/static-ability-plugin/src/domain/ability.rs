//! Grant-list implementation of [`Ability`].

use content_manager_sdk::{Ability, AbilityGrant, Action, Entity, FieldSet, Filter};

/// Ability answering from a fixed list of grants.
///
/// Grants are additive: an action is allowed when any grant for it applies,
/// and the covered fields are the union of the applicable grants' fields.
#[derive(Debug, Clone, Default)]
pub struct StaticAbility {
    grants: Vec<AbilityGrant>,
}

impl StaticAbility {
    #[must_use]
    pub fn new(grants: Vec<AbilityGrant>) -> Self {
        Self { grants }
    }

    #[must_use]
    pub fn grants(&self) -> &[AbilityGrant] {
        &self.grants
    }

    fn applicable(&self, action: Action, subject: &str) -> impl Iterator<Item = &AbilityGrant> {
        self.grants
            .iter()
            .filter(move |grant| grant.applies_to(action, subject))
    }
}

impl Ability for StaticAbility {
    fn can(&self, action: Action, subject: &str) -> bool {
        self.applicable(action, subject).next().is_some()
    }

    fn can_record(&self, action: Action, subject: &str, record: &Entity) -> bool {
        self.applicable(action, subject)
            .any(|grant| grant.holds_for(record))
    }

    fn permitted_fields(
        &self,
        action: Action,
        subject: &str,
        record: Option<&Entity>,
    ) -> FieldSet {
        self.applicable(action, subject)
            .filter(|grant| record.is_none_or(|record| grant.holds_for(record)))
            .map(AbilityGrant::field_set)
            .fold(FieldSet::none(), FieldSet::union)
    }

    fn conditions(&self, action: Action, subject: &str) -> Vec<Filter> {
        let mut conditions = Vec::new();
        for grant in self.applicable(action, subject) {
            match &grant.condition {
                Some(condition) => conditions.push(condition.clone()),
                None => return Vec::new(),
            }
        }
        conditions
    }
}
