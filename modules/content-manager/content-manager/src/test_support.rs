#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use content_manager_sdk::testing::InMemoryEntityManager;
use content_manager_sdk::{
    AbilityGrant, AttributeDescriptor, ContentTypeSchema, MEDIA_UID, SecurityContext,
    StaticSchemaRegistry, TelemetrySink,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use static_ability_plugin::StaticAbility;
use uuid::Uuid;

use crate::config::ContentManagerConfig;
use crate::domain::Service;

pub const ARTICLE: &str = "api::article.article";
pub const USER: &str = "api::user.user";
pub const COMPANY: &str = "api::company.company";
pub const TAG: &str = "api::tag.tag";
/// Content type without draft and publish.
pub const PAGE: &str = "api::page.page";

/// Blog-like schema graph covering every attribute kind.
#[must_use]
pub fn blog_registry() -> StaticSchemaRegistry {
    StaticSchemaRegistry::new()
        .with(
            ContentTypeSchema::builder(ARTICLE)
                .attribute("title", AttributeDescriptor::scalar())
                .attribute("status", AttributeDescriptor::scalar())
                .attribute("slug", AttributeDescriptor::scalar().read_only())
                .attribute("author", AttributeDescriptor::relation(USER))
                .attribute("tags", AttributeDescriptor::relation(TAG))
                .attribute("cover", AttributeDescriptor::media())
                .attribute("seo", AttributeDescriptor::component("shared.seo", false))
                .attribute(
                    "blocks",
                    AttributeDescriptor::dynamic_zone(["blocks.text", "blocks.quote"]),
                )
                .attribute("related", AttributeDescriptor::polymorphic_relation())
                .attribute("legacy", AttributeDescriptor::relation("api::ghost.ghost"))
                .draft_and_publish(true)
                .build(),
        )
        .with(
            ContentTypeSchema::builder(USER)
                .attribute("name", AttributeDescriptor::scalar())
                .attribute("email", AttributeDescriptor::scalar())
                .attribute("company", AttributeDescriptor::relation(COMPANY))
                .build(),
        )
        .with(
            ContentTypeSchema::builder(COMPANY)
                .attribute("name", AttributeDescriptor::scalar())
                .attribute("country", AttributeDescriptor::scalar())
                .build(),
        )
        .with(
            ContentTypeSchema::builder(TAG)
                .attribute("label", AttributeDescriptor::scalar())
                .build(),
        )
        .with(
            ContentTypeSchema::builder("shared.seo")
                .attribute("metaTitle", AttributeDescriptor::scalar())
                .attribute("metaDescription", AttributeDescriptor::scalar())
                .build(),
        )
        .with(
            ContentTypeSchema::builder("blocks.text")
                .attribute("body", AttributeDescriptor::scalar())
                .attribute("align", AttributeDescriptor::scalar())
                .build(),
        )
        .with(
            ContentTypeSchema::builder("blocks.quote")
                .attribute("text", AttributeDescriptor::scalar())
                .attribute("author", AttributeDescriptor::scalar())
                .build(),
        )
        .with(
            ContentTypeSchema::builder(MEDIA_UID)
                .attribute("url", AttributeDescriptor::scalar())
                .attribute("name", AttributeDescriptor::scalar())
                .attribute("mime", AttributeDescriptor::scalar())
                .build(),
        )
        .with(
            ContentTypeSchema::builder(PAGE)
                .attribute("title", AttributeDescriptor::scalar())
                .build(),
        )
}

/// Unwrap a JSON object literal.
///
/// # Panics
///
/// If `value` is not an object.
#[must_use]
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

#[must_use]
pub fn ctx_with(grants: Vec<AbilityGrant>) -> SecurityContext {
    ctx_for_subject(Uuid::new_v4(), grants)
}

#[must_use]
pub fn ctx_for_subject(subject_id: Uuid, grants: Vec<AbilityGrant>) -> SecurityContext {
    SecurityContext::builder()
        .subject_id(subject_id)
        .ability(Arc::new(StaticAbility::new(grants)))
        .build()
}

#[must_use]
pub fn ctx_deny_all() -> SecurityContext {
    SecurityContext::anonymous()
}

/// Telemetry sink that keeps every event.
#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingTelemetry {
    #[must_use]
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().clone()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn emit(&self, event: &str, properties: Value) {
        self.events.lock().push((event.to_owned(), properties));
    }
}

/// Service over the blog registry and the given collaborators.
pub struct Harness {
    pub service: Service,
    pub entities: Arc<InMemoryEntityManager>,
    pub telemetry: Arc<RecordingTelemetry>,
}

#[must_use]
pub fn harness(entities: InMemoryEntityManager) -> Harness {
    harness_with_config(entities, ContentManagerConfig::default())
}

#[must_use]
pub fn harness_with_config(
    entities: InMemoryEntityManager,
    config: ContentManagerConfig,
) -> Harness {
    let entities = Arc::new(entities);
    let telemetry = Arc::new(RecordingTelemetry::default());
    let service = Service::new(
        Arc::new(blog_registry()),
        entities.clone(),
        telemetry.clone(),
        config,
    );
    Harness {
        service,
        entities,
        telemetry,
    }
}
