//! Stored records of a content type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::populate::PopulateSpec;

/// Attribute names the platform manages itself.
pub mod system_attributes {
    pub const ID: &str = "id";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
    pub const PUBLISHED_AT: &str = "publishedAt";
    pub const CREATED_BY: &str = "createdBy";
    pub const UPDATED_BY: &str = "updatedBy";

    /// Never writable by callers.
    pub const RESERVED: &[&str] = &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        PUBLISHED_AT,
        CREATED_BY,
        UPDATED_BY,
    ];

    /// Discriminator of a dynamic-zone entry (component uid).
    pub const COMPONENT: &str = "__component";
    /// Discriminator of a polymorphic relation entry (content type uid).
    pub const TYPE: &str = "__type";
}

/// A record of some content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: Uuid,
    /// Attribute values, including populated relations and components.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    /// `None` while the entry is a draft.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

impl Entity {
    #[must_use]
    pub fn new(id: Uuid, attributes: Map<String, Value>) -> Self {
        Self {
            id,
            attributes,
            published_at: None,
        }
    }

    #[must_use]
    pub fn published(mut self, at: OffsetDateTime) -> Self {
        self.published_at = Some(at);
        self
    }

    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.published_at.is_none()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// The record as seen by grant conditions: all attributes plus `id` and
    /// `publishedAt`.
    #[must_use]
    pub fn as_record(&self) -> Value {
        let mut record = self.attributes.clone();
        record.insert(
            system_attributes::ID.to_owned(),
            Value::String(self.id.to_string()),
        );
        let published_at = self
            .published_at
            .and_then(|at| {
                at.format(&time::format_description::well_known::Rfc3339)
                    .ok()
            })
            .map_or(Value::Null, Value::String);
        record.insert(system_attributes::PUBLISHED_AT.to_owned(), published_at);
        Value::Object(record)
    }
}

/// Options for fetching a single record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOneOptions {
    /// Related data to join so that conditions on nested paths can be evaluated.
    pub populate: PopulateSpec,
    /// Include relation counts in the returned record.
    pub with_counts: bool,
}

impl FindOneOptions {
    #[must_use]
    pub fn with_counts(populate: PopulateSpec) -> Self {
        Self {
            populate,
            with_counts: true,
        }
    }
}
