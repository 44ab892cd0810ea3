//! Audit metadata written onto every mutation.

use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::entity::system_attributes;

/// Who is writing, and whether the write creates or edits the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStamp {
    /// First write: sets creator and updater.
    Creator { by: Uuid, at: OffsetDateTime },
    /// Subsequent write: sets the updater only.
    Editor { by: Uuid, at: OffsetDateTime },
}

impl AuditStamp {
    #[must_use]
    pub fn creator(by: Uuid) -> Self {
        Self::Creator {
            by,
            at: OffsetDateTime::now_utc(),
        }
    }

    #[must_use]
    pub fn editor(by: Uuid) -> Self {
        Self::Editor {
            by,
            at: OffsetDateTime::now_utc(),
        }
    }

    #[must_use]
    pub fn by(&self) -> Uuid {
        match self {
            Self::Creator { by, .. } | Self::Editor { by, .. } => *by,
        }
    }

    #[must_use]
    pub fn at(&self) -> OffsetDateTime {
        match self {
            Self::Creator { at, .. } | Self::Editor { at, .. } => *at,
        }
    }

    #[must_use]
    pub fn is_edition(&self) -> bool {
        matches!(self, Self::Editor { .. })
    }

    /// Overwrite the audit attributes of `attributes`.
    ///
    /// Caller-supplied values for these keys are replaced, never merged.
    pub fn apply(&self, attributes: &mut Map<String, Value>) {
        let by = Value::String(self.by().to_string());
        let at = self
            .at()
            .to_offset(time::UtcOffset::UTC)
            .format(&Rfc3339)
            .ok()
            .map_or(Value::Null, Value::String);

        if !self.is_edition() {
            attributes.insert(system_attributes::CREATED_BY.to_owned(), by.clone());
            attributes.insert(system_attributes::CREATED_AT.to_owned(), at.clone());
        }
        attributes.insert(system_attributes::UPDATED_BY.to_owned(), by);
        attributes.insert(system_attributes::UPDATED_AT.to_owned(), at);
    }
}
