#![allow(clippy::unwrap_used, clippy::expect_used)]

use content_manager_sdk::testing::InMemoryEntityManager;
use content_manager_sdk::{
    AbilityGrant, Action, BulkDeleteInput, Entity, EntityManagerError, EntityQuery, Filter,
    events,
};
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::test_support::{ARTICLE, PAGE, ctx_for_subject, ctx_with, harness, object};

fn full_access(uid: &str) -> Vec<AbilityGrant> {
    [
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Publish,
        Action::Unpublish,
    ]
    .into_iter()
    .map(|action| AbilityGrant::new(action, uid))
    .collect()
}

#[tokio::test]
async fn create_filters_input_and_stamps_creator() {
    let h = harness(InMemoryEntityManager::new());
    let subject = Uuid::new_v4();
    let ctx = ctx_for_subject(
        subject,
        vec![
            AbilityGrant::new(Action::Create, ARTICLE).with_fields(["title", "slug"]),
            AbilityGrant::new(Action::Read, ARTICLE),
        ],
    );

    let created = h
        .service
        .create(
            &ctx,
            ARTICLE,
            object(json!({
                "title": "A",
                "status": "draft",
                "slug": "read-only",
                "createdBy": "spoofed"
            })),
        )
        .await
        .unwrap();

    let sent = h.entities.last_input().unwrap();
    let attributes = sent.attributes();
    assert_eq!(attributes.get("title"), Some(&json!("A")));
    assert!(!attributes.contains_key("status"));
    assert!(!attributes.contains_key("slug"));
    assert_eq!(attributes.get("createdBy"), Some(&json!(subject.to_string())));
    assert_eq!(attributes.get("updatedBy"), Some(&json!(subject.to_string())));

    assert_eq!(created.get("title"), Some(&json!("A")));
    assert!(created.is_draft());
}

#[tokio::test]
async fn first_entry_telemetry_fires_once() {
    let h = harness(InMemoryEntityManager::new());
    let ctx = ctx_with(full_access(ARTICLE));

    for title in ["A", "B"] {
        h.service
            .create(&ctx, ARTICLE, object(json!({ "title": title })))
            .await
            .unwrap();
    }

    assert_eq!(
        h.telemetry.events(),
        vec![(
            events::DID_CREATE_FIRST_ENTRY.to_owned(),
            json!({ "eventProperties": { "model": ARTICLE } })
        )]
    );
    assert_eq!(h.entities.calls(), vec!["count", "create", "count", "create"]);
}

#[tokio::test]
async fn update_uses_grants_matching_existing_entry() {
    let entry = Entity::new(
        Uuid::new_v4(),
        object(json!({ "title": "A", "status": "draft", "createdBy": "author" })),
    );
    let h = harness(InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()));
    let subject = Uuid::new_v4();
    let ctx = ctx_for_subject(
        subject,
        vec![
            AbilityGrant::new(Action::Update, ARTICLE)
                .with_condition(Filter::eq("status", "draft"))
                .with_fields(["title"]),
            AbilityGrant::new(Action::Read, ARTICLE),
        ],
    );

    let updated = h
        .service
        .update(
            &ctx,
            ARTICLE,
            entry.id,
            object(json!({ "title": "B", "status": "live" })),
        )
        .await
        .unwrap();

    assert_eq!(updated.get("title"), Some(&json!("B")));
    assert_eq!(updated.get("status"), Some(&json!("draft")));
    assert_eq!(updated.get("createdBy"), Some(&json!("author")));
    assert_eq!(updated.get("updatedBy"), Some(&json!(subject.to_string())));
    assert_eq!(h.entities.calls(), vec!["find_one", "update"]);
}

#[tokio::test]
async fn delete_returns_the_removed_entry() {
    let entry = Entity::new(Uuid::new_v4(), object(json!({ "title": "A", "status": "x" })));
    let h = harness(InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()));
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Delete, ARTICLE),
        AbilityGrant::new(Action::Read, ARTICLE).with_fields(["title"]),
    ]);

    let deleted = h.service.delete(&ctx, ARTICLE, entry.id).await.unwrap();

    assert_eq!(deleted.attributes, object(json!({ "title": "A" })));
    assert!(h.entities.entities(ARTICLE).is_empty());
}

#[tokio::test]
async fn publish_and_unpublish_follow_the_entry_state() {
    let entry = Entity::new(Uuid::new_v4(), object(json!({ "title": "A" })));
    let h = harness(InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()));
    let ctx = ctx_with(full_access(ARTICLE));
    let svc = &h.service;

    let err = svc.unpublish(&ctx, ARTICLE, entry.id).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::InvalidTransition { action: Action::Unpublish, .. }
    ));

    let published = svc.publish(&ctx, ARTICLE, entry.id).await.unwrap();
    assert!(!published.is_draft());

    let err = svc.publish(&ctx, ARTICLE, entry.id).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::InvalidTransition { action: Action::Publish, .. }
    ));

    let draft = svc.unpublish(&ctx, ARTICLE, entry.id).await.unwrap();
    assert!(draft.is_draft());
}

#[tokio::test]
async fn publish_requires_draft_and_publish() {
    let entry = Entity::new(Uuid::new_v4(), object(json!({ "title": "About" })));
    let h = harness(InMemoryEntityManager::new().with_entity(PAGE, entry.clone()));
    let ctx = ctx_with(full_access(PAGE));

    let err = h.service.publish(&ctx, PAGE, entry.id).await.unwrap_err();

    assert!(matches!(err, DomainError::InvalidTransition { .. }));
    assert!(!h.entities.was_called("publish"));
}

#[tokio::test]
async fn publish_record_check_uses_publish_grants() {
    let entry = Entity::new(Uuid::new_v4(), object(json!({ "title": "A", "status": "review" })));
    let h = harness(InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()));
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Publish, ARTICLE)
            .with_condition(Filter::eq("status", "approved")),
    ]);

    let err = h.service.publish(&ctx, ARTICLE, entry.id).await.unwrap_err();

    assert!(matches!(err, DomainError::Forbidden));
    assert!(!h.entities.was_called("publish"));
}

#[tokio::test]
async fn empty_bulk_delete_is_rejected_without_storage() {
    let h = harness(InMemoryEntityManager::new());
    let ctx = ctx_with(full_access(ARTICLE));

    let err = h
        .service
        .bulk_delete(
            &ctx,
            ARTICLE,
            BulkDeleteInput { ids: vec![] },
            EntityQuery::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation { .. }));
    assert!(h.entities.calls().is_empty());
}

#[tokio::test]
async fn bulk_delete_only_removes_permitted_entries() {
    let removable: Vec<Entity> = (0..2)
        .map(|_| Entity::new(Uuid::new_v4(), object(json!({ "status": "draft" }))))
        .collect();
    let live = Entity::new(Uuid::new_v4(), object(json!({ "status": "live" })));
    let untouched = Entity::new(Uuid::new_v4(), object(json!({ "status": "draft" })));
    let manager = InMemoryEntityManager::new()
        .with_entity(ARTICLE, removable[0].clone())
        .with_entity(ARTICLE, removable[1].clone())
        .with_entity(ARTICLE, live.clone())
        .with_entity(ARTICLE, untouched.clone());
    let h = harness(manager);
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Delete, ARTICLE).with_condition(Filter::eq("status", "draft")),
    ]);

    let result = h
        .service
        .bulk_delete(
            &ctx,
            ARTICLE,
            BulkDeleteInput {
                ids: vec![removable[0].id, removable[1].id, live.id],
            },
            EntityQuery::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.count, 2);
    assert_eq!(h.entities.entities(ARTICLE), vec![live, untouched]);
    assert_eq!(h.entities.calls(), vec!["delete_many"]);
}

#[tokio::test]
async fn bulk_delete_narrows_ids_by_deletable_query_filters() {
    let draft_a = Entity::new(Uuid::new_v4(), object(json!({ "title": "A", "status": "draft" })));
    let live = Entity::new(Uuid::new_v4(), object(json!({ "title": "A", "status": "live" })));
    let draft_b = Entity::new(Uuid::new_v4(), object(json!({ "title": "B", "status": "draft" })));
    let manager = InMemoryEntityManager::new()
        .with_entity(ARTICLE, draft_a.clone())
        .with_entity(ARTICLE, live.clone())
        .with_entity(ARTICLE, draft_b.clone());
    let h = harness(manager);
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Delete, ARTICLE).with_fields(["status"]),
    ]);
    let ids = vec![draft_a.id, live.id, draft_b.id];

    let result = h
        .service
        .bulk_delete(
            &ctx,
            ARTICLE,
            BulkDeleteInput { ids: ids.clone() },
            EntityQuery::new().filters(Filter::and([
                Filter::eq("title", "B"),
                Filter::eq("status", "draft"),
            ])),
        )
        .await
        .unwrap();

    // `title` is not deletable by, so only the `status` leaf narrows the ids
    assert_eq!(result.count, 2);
    assert_eq!(h.entities.entities(ARTICLE), vec![live]);
    assert_eq!(
        h.entities.last_query().unwrap().filters,
        Some(Filter::and([
            Filter::is_in("id", ids.iter().map(ToString::to_string).collect::<Vec<_>>()),
            Filter::and([Filter::eq("status", "draft")]),
        ]))
    );
}

#[tokio::test]
async fn draft_relations_are_counted_after_record_check() {
    let entry = Entity::new(Uuid::new_v4(), object(json!({ "title": "A" })))
        .published(OffsetDateTime::now_utc());
    let manager = InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone());
    manager.set_draft_relations(entry.id, 3);
    let h = harness(manager);
    let ctx = ctx_with(vec![AbilityGrant::new(Action::Read, ARTICLE)]);

    let count = h
        .service
        .count_draft_relations(&ctx, ARTICLE, entry.id)
        .await
        .unwrap();

    assert_eq!(count, 3);
    assert!(h.entities.last_find_one().unwrap().with_counts);
}

#[tokio::test]
async fn storage_failures_surface_as_storage_errors() {
    let manager = InMemoryEntityManager::new();
    manager.fail_with(EntityManagerError::Unavailable("db down".to_owned()));
    let h = harness(manager);
    let ctx = ctx_with(full_access(ARTICLE));

    let err = h
        .service
        .create(&ctx, ARTICLE, object(json!({ "title": "A" })))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Storage(EntityManagerError::Unavailable(_))));
    assert!(h.telemetry.events().is_empty());
}
