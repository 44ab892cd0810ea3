#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Content Manager SDK
//!
//! This crate provides the public contract of the `content_manager` module:
//!
//! - [`ContentManagerClient`] - Public API trait for consumers
//! - [`ContentTypeSchema`], [`AttributeKind`], [`SchemaRegistry`] - Dynamic schema model
//! - [`Filter`], [`EntityQuery`], [`PopulateSpec`] - Query and population model
//! - [`Ability`], [`Action`], [`FieldSet`], [`AbilityGrant`] - Ability (grant) interface
//! - [`SecurityContext`] - Caller identity bound to its ability
//! - [`EntityManager`] - Storage-facing contract (implemented outside this module)
//! - [`TelemetrySink`] - Fire-and-forget telemetry
//! - [`ContentManagerError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use content_manager_sdk::{ContentManagerClient, EntityQuery, Filter};
//!
//! let client: Arc<dyn ContentManagerClient> = Arc::new(ContentManagerLocalClient::new(service));
//!
//! let page = client
//!     .find(&ctx, "api::article.article", EntityQuery::new().filters(Filter::eq("title", "A")))
//!     .await?;
//! ```

pub mod ability;
pub mod api;
pub mod audit;
pub mod entity;
pub mod error;
pub mod filter;
pub mod manager;
pub mod models;
pub mod populate;
pub mod query;
pub mod schema;
pub mod security;
pub mod telemetry;

#[cfg(feature = "testing")]
pub mod testing;

// Re-export main types at crate root
pub use ability::{Ability, AbilityGrant, Action, DenyAll, FieldSet};
pub use api::ContentManagerClient;
pub use audit::AuditStamp;
pub use entity::{Entity, FindOneOptions, system_attributes};
pub use error::ContentManagerError;
pub use filter::{AttributePath, Filter, Operator, Predicate};
pub use manager::{EntityManager, EntityManagerError, SanitizedInput};
pub use models::{BulkDeleteInput, BulkDeleteResult};
pub use populate::{PopulateNode, PopulateSpec};
pub use query::{EntityQuery, Page, PageInfo, Pagination, SortKey, SortOrder};
pub use schema::{
    AttributeDescriptor, AttributeKind, ContentTypeSchema, ContentTypeSchemaBuilder, MEDIA_UID,
    RelationTarget, SchemaError, SchemaRegistry, StaticSchemaRegistry,
};
pub use security::{SecurityContext, SecurityContextBuilder};
pub use telemetry::{NoopTelemetry, TelemetrySink, events};
