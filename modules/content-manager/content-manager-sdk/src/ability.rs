//! Ability interface: the caller's grants, already bound to the caller.
//!
//! The engine behind an [`Ability`] is pluggable. The content manager only
//! asks three questions: may the caller perform an action on a content type
//! at all, may it perform it on a given record, and which fields does the
//! action cover.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::filter::Filter;

/// Content-manager actions subject to grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Publish,
    Unpublish,
}

impl Action {
    /// Stable permission identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Read => "plugin::content-manager.explorer.read",
            Self::Create => "plugin::content-manager.explorer.create",
            Self::Update => "plugin::content-manager.explorer.update",
            Self::Delete => "plugin::content-manager.explorer.delete",
            Self::Publish => "plugin::content-manager.explorer.publish",
            Self::Unpublish => "plugin::content-manager.explorer.unpublish",
        }
    }

    /// Short lowercase name, as used in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Publish => "publish",
            Self::Unpublish => "unpublish",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Set of attribute paths an action covers.
///
/// Paths are dotted; allowing a path allows everything below it, so `seo`
/// covers `seo.title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSet {
    All,
    Only(BTreeSet<String>),
}

impl FieldSet {
    #[must_use]
    pub fn none() -> Self {
        Self::Only(BTreeSet::new())
    }

    #[must_use]
    pub fn only<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(paths.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Only(paths) if paths.is_empty())
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, _) | (_, Self::All) => Self::All,
            (Self::Only(mut a), Self::Only(b)) => {
                a.extend(b);
                Self::Only(a)
            }
        }
    }

    /// Whether `path` itself is covered (exactly or through an ancestor).
    #[must_use]
    pub fn permits(&self, path: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(paths) => paths.iter().any(|allowed| covers(allowed, path)),
        }
    }

    /// Whether `path` or anything below it is covered.
    #[must_use]
    pub fn permits_any_under(&self, path: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(paths) => paths
                .iter()
                .any(|allowed| covers(allowed, path) || covers(path, allowed)),
        }
    }

    /// The part of this set below `prefix`, re-rooted at `prefix`.
    #[must_use]
    pub fn nested(&self, prefix: &str) -> Self {
        match self {
            Self::All => Self::All,
            Self::Only(_) if self.permits(prefix) => Self::All,
            Self::Only(paths) => Self::Only(
                paths
                    .iter()
                    .filter_map(|allowed| {
                        allowed
                            .strip_prefix(prefix)
                            .and_then(|rest| rest.strip_prefix('.'))
                            .map(str::to_owned)
                    })
                    .collect(),
            ),
        }
    }
}

fn covers(ancestor: &str, path: &str) -> bool {
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// One grant as stored by an ability engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbilityGrant {
    pub action: Action,
    /// Content type uid the grant applies to.
    pub subject: String,
    /// Record-level condition. `None` means the grant is unconditional.
    #[serde(default)]
    pub condition: Option<Filter>,
    /// Field list. `None` grants every field.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

impl AbilityGrant {
    #[must_use]
    pub fn new(action: Action, subject: impl Into<String>) -> Self {
        Self {
            action,
            subject: subject.into(),
            condition: None,
            fields: None,
        }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Filter) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn applies_to(&self, action: Action, subject: &str) -> bool {
        self.action == action && self.subject == subject
    }

    /// Whether the grant's condition holds for the record.
    #[must_use]
    pub fn holds_for(&self, record: &Entity) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.matches(&record.as_record()))
    }

    #[must_use]
    pub fn field_set(&self) -> FieldSet {
        self.fields
            .as_ref()
            .map_or(FieldSet::All, |fields| FieldSet::only(fields.iter().cloned()))
    }
}

/// The caller's capabilities.
///
/// Implementations fail closed: an action or subject they know nothing about
/// is denied and covers no fields.
pub trait Ability: Send + Sync {
    /// Collection-level check, ignoring record conditions.
    fn can(&self, action: Action, subject: &str) -> bool;

    /// Record-level check: some grant for the action applies to `record`.
    fn can_record(&self, action: Action, subject: &str, record: &Entity) -> bool;

    /// Fields covered by the action. With a record, only grants whose condition
    /// holds for it contribute.
    fn permitted_fields(&self, action: Action, subject: &str, record: Option<&Entity>)
    -> FieldSet;

    /// Record-level restriction of the action as an any-of list of conditions.
    ///
    /// Empty when some grant is unconditional (or there are no grants, which
    /// [`can`](Self::can) already rejects). Used to scope list and bulk queries
    /// and to know which paths a record check will read.
    fn conditions(&self, _action: Action, _subject: &str) -> Vec<Filter> {
        Vec::new()
    }
}

/// Ability with no grants.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Ability for DenyAll {
    fn can(&self, _action: Action, _subject: &str) -> bool {
        false
    }

    fn can_record(&self, _action: Action, _subject: &str, _record: &Entity) -> bool {
        false
    }

    fn permitted_fields(
        &self,
        _action: Action,
        _subject: &str,
        _record: Option<&Entity>,
    ) -> FieldSet {
        FieldSet::none()
    }
}
