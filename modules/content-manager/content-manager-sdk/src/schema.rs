//! Dynamic content-type schemas.
//!
//! A content type is an ordered set of named attributes. Each attribute has a
//! closed [`AttributeKind`]; relational kinds carry the uid of the schema they
//! point at, except polymorphic relations and dynamic zones whose target is
//! only known per record.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::entity::system_attributes;

/// Uid of the built-in schema every media attribute resolves to.
pub const MEDIA_UID: &str = "plugin::upload.file";

/// Target of a relation attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationTarget {
    /// The relation always points at the given content type.
    Fixed(String),
    /// The target content type varies per record (`morphTo`-style).
    Polymorphic,
}

/// Kind of a schema attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    /// Plain value (string, number, boolean, date, JSON, ...).
    Scalar,
    /// Relation to another content type.
    Relation(RelationTarget),
    /// Reference to one or more uploaded files.
    Media,
    /// Embedded component with its own schema.
    Component {
        /// Uid of the component schema.
        component: String,
        /// Whether the attribute holds a list of components.
        repeatable: bool,
    },
    /// List of components whose shape is picked per entry.
    DynamicZone {
        /// Uids of the components allowed in the zone.
        components: Vec<String>,
    },
}

impl AttributeKind {
    /// Uid of the schema this attribute statically resolves to, if any.
    ///
    /// `None` for scalars, polymorphic relations and dynamic zones.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Relation(RelationTarget::Fixed(target)) => Some(target),
            Self::Media => Some(MEDIA_UID),
            Self::Component { component, .. } => Some(component),
            Self::Scalar
            | Self::Relation(RelationTarget::Polymorphic)
            | Self::DynamicZone { .. } => None,
        }
    }
}

/// Metadata for one schema attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub kind: AttributeKind,
    /// `false` for system or computed attributes callers may never write.
    pub writable: bool,
}

impl AttributeDescriptor {
    #[must_use]
    pub fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            writable: true,
        }
    }

    #[must_use]
    pub fn scalar() -> Self {
        Self::new(AttributeKind::Scalar)
    }

    #[must_use]
    pub fn relation(target: impl Into<String>) -> Self {
        Self::new(AttributeKind::Relation(RelationTarget::Fixed(target.into())))
    }

    #[must_use]
    pub fn polymorphic_relation() -> Self {
        Self::new(AttributeKind::Relation(RelationTarget::Polymorphic))
    }

    #[must_use]
    pub fn media() -> Self {
        Self::new(AttributeKind::Media)
    }

    #[must_use]
    pub fn component(component: impl Into<String>, repeatable: bool) -> Self {
        Self::new(AttributeKind::Component {
            component: component.into(),
            repeatable,
        })
    }

    #[must_use]
    pub fn dynamic_zone<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(AttributeKind::DynamicZone {
            components: components.into_iter().map(Into::into).collect(),
        })
    }

    /// Mark the attribute as not writable by callers.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

static ID_ATTRIBUTE: AttributeDescriptor = AttributeDescriptor {
    kind: AttributeKind::Scalar,
    writable: false,
};

/// Schema of one content type or component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeSchema {
    uid: String,
    attributes: Vec<(String, AttributeDescriptor)>,
    draft_and_publish: bool,
}

impl ContentTypeSchema {
    #[must_use]
    pub fn builder(uid: impl Into<String>) -> ContentTypeSchemaBuilder {
        ContentTypeSchemaBuilder {
            schema: Self {
                uid: uid.into(),
                attributes: Vec::new(),
                draft_and_publish: false,
            },
        }
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Look up an attribute by name.
    ///
    /// `id` resolves to an implicit, non-writable scalar on every schema.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        if name == system_attributes::ID {
            return Some(&ID_ATTRIBUTE);
        }
        self.attributes
            .iter()
            .find_map(|(attr, descriptor)| (attr == name).then_some(descriptor))
    }

    /// Attributes in declaration order (without the implicit `id`).
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeDescriptor)> {
        self.attributes
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    #[must_use]
    pub fn has_draft_and_publish(&self) -> bool {
        self.draft_and_publish
    }

    /// Whether callers may write the attribute: it must be declared, marked
    /// writable and not be one of the reserved system attributes.
    #[must_use]
    pub fn is_writable(&self, name: &str) -> bool {
        !system_attributes::RESERVED.contains(&name)
            && self.attribute(name).is_some_and(|attr| attr.writable)
    }
}

pub struct ContentTypeSchemaBuilder {
    schema: ContentTypeSchema,
}

impl ContentTypeSchemaBuilder {
    /// Declare an attribute. Redeclaring a name replaces the previous descriptor
    /// in place.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, descriptor: AttributeDescriptor) -> Self {
        let name = name.into();
        if let Some(slot) = self
            .schema
            .attributes
            .iter_mut()
            .find(|(existing, _)| *existing == name)
        {
            slot.1 = descriptor;
        } else {
            self.schema.attributes.push((name, descriptor));
        }
        self
    }

    #[must_use]
    pub fn draft_and_publish(mut self, enabled: bool) -> Self {
        self.schema.draft_and_publish = enabled;
        self
    }

    #[must_use]
    pub fn build(self) -> ContentTypeSchema {
        self.schema
    }
}

/// Errors from schema lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("content type not found: {uid}")]
    NotFound { uid: String },
}

/// Read-only schema lookup.
///
/// Schemas are immutable snapshots for the lifetime of a request; the owner of
/// the registry refreshes them out of band.
pub trait SchemaRegistry: Send + Sync {
    /// Resolve a content type or component schema by uid.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::NotFound`] if the uid is unknown
    fn schema_of(&self, uid: &str) -> Result<Arc<ContentTypeSchema>, SchemaError>;
}

/// In-memory registry built from a fixed set of schemas.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaRegistry {
    schemas: HashMap<String, Arc<ContentTypeSchema>>,
}

impl StaticSchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema, replacing any schema registered under the same uid.
    #[must_use]
    pub fn with(mut self, schema: ContentTypeSchema) -> Self {
        self.register(schema);
        self
    }

    pub fn register(&mut self, schema: ContentTypeSchema) {
        self.schemas
            .insert(schema.uid().to_owned(), Arc::new(schema));
    }
}

impl SchemaRegistry for StaticSchemaRegistry {
    fn schema_of(&self, uid: &str) -> Result<Arc<ContentTypeSchema>, SchemaError> {
        self.schemas
            .get(uid)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound {
                uid: uid.to_owned(),
            })
    }
}
