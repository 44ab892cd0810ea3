//! Caller identity bound to its ability.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::ability::{Ability, DenyAll};

/// Who is calling, and what they may do.
///
/// Cheap to clone; the ability is shared.
#[derive(Clone)]
pub struct SecurityContext {
    subject_id: Uuid,
    subject_type: Option<String>,
    ability: Arc<dyn Ability>,
}

impl SecurityContext {
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Nil subject with no grants.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            subject_id: Uuid::nil(),
            subject_type: None,
            ability: Arc::new(DenyAll),
        }
    }

    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    #[must_use]
    pub fn subject_type(&self) -> Option<&str> {
        self.subject_type.as_deref()
    }

    #[must_use]
    pub fn ability(&self) -> &dyn Ability {
        self.ability.as_ref()
    }
}

impl fmt::Debug for SecurityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityContext")
            .field("subject_id", &self.subject_id)
            .field("subject_type", &self.subject_type)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    subject_id: Option<Uuid>,
    subject_type: Option<String>,
    ability: Option<Arc<dyn Ability>>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn subject_type(mut self, subject_type: impl Into<String>) -> Self {
        self.subject_type = Some(subject_type.into());
        self
    }

    #[must_use]
    pub fn ability(mut self, ability: Arc<dyn Ability>) -> Self {
        self.ability = Some(ability);
        self
    }

    /// Missing parts default to the anonymous context.
    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            subject_id: self.subject_id.unwrap_or_default(),
            subject_type: self.subject_type,
            ability: self.ability.unwrap_or_else(|| Arc::new(DenyAll)),
        }
    }
}
