#![allow(clippy::unwrap_used, clippy::expect_used)]

use content_manager_sdk::testing::InMemoryEntityManager;
use content_manager_sdk::{
    AbilityGrant, Action, BulkDeleteInput, Entity, EntityQuery, Filter, PopulateNode,
    PopulateSpec,
};
use serde_json::json;
use time::OffsetDateTime;
use tracing_test::traced_test;
use uuid::Uuid;

use crate::config::ContentManagerConfig;
use crate::domain::error::DomainError;
use crate::test_support::{
    ARTICLE, USER, ctx_deny_all, ctx_with, harness, harness_with_config, object,
};

fn article(attributes: serde_json::Value) -> Entity {
    Entity::new(Uuid::new_v4(), object(attributes))
}

#[tokio::test]
async fn denied_collection_check_never_reaches_storage() {
    let entry = article(json!({ "title": "A" }));
    let h = harness(InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()));
    let ctx = ctx_deny_all();
    let svc = &h.service;

    let results = [
        svc.find(&ctx, ARTICLE, EntityQuery::new()).await.err(),
        svc.find_one(&ctx, ARTICLE, entry.id, EntityQuery::new())
            .await
            .err(),
        svc.create(&ctx, ARTICLE, object(json!({ "title": "B" })))
            .await
            .err(),
        svc.update(&ctx, ARTICLE, entry.id, object(json!({ "title": "B" })))
            .await
            .err(),
        svc.delete(&ctx, ARTICLE, entry.id).await.err(),
        svc.publish(&ctx, ARTICLE, entry.id).await.err(),
        svc.unpublish(&ctx, ARTICLE, entry.id).await.err(),
        svc.bulk_delete(
            &ctx,
            ARTICLE,
            BulkDeleteInput {
                ids: vec![entry.id],
            },
            EntityQuery::new(),
        )
        .await
        .err(),
        svc.count_draft_relations(&ctx, ARTICLE, entry.id)
            .await
            .err(),
    ];

    for result in results {
        assert!(
            matches!(result, Some(DomainError::Forbidden)),
            "Expected Forbidden, got: {result:?}"
        );
    }
    assert!(h.entities.calls().is_empty());
}

#[tokio::test]
async fn unknown_content_type_is_rejected_first() {
    let h = harness(InMemoryEntityManager::new());
    let ctx = ctx_deny_all();

    let err = h
        .service
        .find(&ctx, "api::nope.nope", EntityQuery::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::SchemaNotFound { uid } if uid == "api::nope.nope"));
    assert!(h.entities.calls().is_empty());
}

#[tokio::test]
async fn read_fields_limit_output() {
    let entry = article(json!({ "title": "A", "status": "draft" }));
    let h = harness(InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()));
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Read, ARTICLE).with_fields(["title"]),
    ]);

    let found = h
        .service
        .find_one(&ctx, ARTICLE, entry.id, EntityQuery::new())
        .await
        .unwrap();

    assert_eq!(found.id, entry.id);
    assert_eq!(found.attributes, object(json!({ "title": "A" })));
}

#[tokio::test]
async fn missing_entry_is_not_found_before_record_check() {
    let h = harness(InMemoryEntityManager::new());
    // the condition can never hold, so a record check would answer Forbidden
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Read, ARTICLE).with_condition(Filter::eq("status", "never")),
    ]);
    let id = Uuid::new_v4();

    let err = h
        .service
        .find_one(&ctx, ARTICLE, id, EntityQuery::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound { id: missing, .. } if missing == id));
}

#[tokio::test]
async fn failed_record_check_blocks_update() {
    let entry = article(json!({ "title": "A", "status": "live" }));
    let h = harness(InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()));
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Update, ARTICLE).with_condition(Filter::eq("status", "draft")),
    ]);

    let err = h
        .service
        .update(&ctx, ARTICLE, entry.id, object(json!({ "title": "B" })))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Forbidden));
    assert_eq!(h.entities.calls(), vec!["find_one"]);
    assert_eq!(h.entities.entities(ARTICLE), vec![entry]);
}

#[tokio::test]
async fn failed_record_check_blocks_every_entry_operation() {
    let entry =
        article(json!({ "title": "A", "status": "live" })).published(OffsetDateTime::now_utc());
    let h = harness(InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()));
    let only_drafts = || Filter::eq("status", "draft");
    let ctx = ctx_with(
        [Action::Read, Action::Delete, Action::Unpublish]
            .into_iter()
            .map(|action| AbilityGrant::new(action, ARTICLE).with_condition(only_drafts()))
            .collect(),
    );
    let svc = &h.service;

    let results = [
        svc.find_one(&ctx, ARTICLE, entry.id, EntityQuery::new())
            .await
            .err(),
        svc.delete(&ctx, ARTICLE, entry.id).await.err(),
        svc.unpublish(&ctx, ARTICLE, entry.id).await.err(),
        svc.count_draft_relations(&ctx, ARTICLE, entry.id)
            .await
            .err(),
    ];

    for result in results {
        assert!(
            matches!(result, Some(DomainError::Forbidden)),
            "Expected Forbidden, got: {result:?}"
        );
    }
    assert_eq!(h.entities.calls(), vec!["find_one"; 4]);
    assert_eq!(h.entities.entities(ARTICLE), vec![entry]);
}

#[tokio::test]
async fn find_is_scoped_to_read_conditions() {
    let draft = article(json!({ "title": "A", "status": "draft" }));
    let live = article(json!({ "title": "B", "status": "live" }));
    let h = harness(
        InMemoryEntityManager::new()
            .with_entity(ARTICLE, draft.clone())
            .with_entity(ARTICLE, live),
    );
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Read, ARTICLE).with_condition(Filter::eq("status", "draft")),
    ]);

    let page = h
        .service
        .find(&ctx, ARTICLE, EntityQuery::new())
        .await
        .unwrap();

    assert_eq!(page.results, vec![draft]);
    assert_eq!(page.pagination.total, 1);
}

#[tokio::test]
async fn find_strips_unreadable_filters_and_clamps_pagination() {
    let h = harness(InMemoryEntityManager::new());
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Read, ARTICLE).with_fields(["title"]),
    ]);

    h.service
        .find(
            &ctx,
            ARTICLE,
            EntityQuery::new()
                .filters(Filter::eq("status", "draft"))
                .page(0, 1000),
        )
        .await
        .unwrap();

    let sent = h.entities.last_query().unwrap();
    assert_eq!(sent.filters, None);
    assert_eq!(sent.pagination.page, 1);
    assert_eq!(sent.pagination.page_size, Some(100));
}

#[tokio::test]
async fn find_preserves_result_order() {
    let entries: Vec<Entity> = (0..5)
        .map(|n| article(json!({ "title": format!("A{n}"), "status": "draft" })))
        .collect();
    let manager = entries.iter().cloned().fold(InMemoryEntityManager::new(), |m, e| {
        m.with_entity(ARTICLE, e)
    });
    let h = harness(manager);
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Read, ARTICLE).with_fields(["title"]),
    ]);

    let page = h
        .service
        .find(&ctx, ARTICLE, EntityQuery::new())
        .await
        .unwrap();

    let ids: Vec<Uuid> = page.results.iter().map(|e| e.id).collect();
    assert_eq!(ids, entries.iter().map(|e| e.id).collect::<Vec<_>>());
    assert!(page.results.iter().all(|e| e.get("status").is_none()));
}

#[tokio::test]
async fn find_one_populates_filter_paths() {
    let entry = article(json!({ "title": "A", "status": "draft", "author": { "name": "Ada" } }));
    let h = harness(InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()));
    let ctx = ctx_with(vec![
        AbilityGrant::new(Action::Read, ARTICLE),
        AbilityGrant::new(Action::Read, USER),
    ]);

    let found = h
        .service
        .find_one(
            &ctx,
            ARTICLE,
            entry.id,
            EntityQuery::new().filters(Filter::and([
                Filter::eq("author.name", "Ada"),
                Filter::eq("status", "draft"),
            ])),
        )
        .await
        .unwrap();

    let options = h.entities.last_find_one().unwrap();
    assert!(options.with_counts);
    assert_eq!(
        options.populate,
        PopulateSpec::single("author", PopulateNode::with_fields(["name"]))
    );
    assert_eq!(found.get("author"), Some(&json!({ "name": "Ada" })));
}

#[tokio::test]
async fn condition_paths_are_populated_when_enabled() {
    let entry = article(json!({
        "title": "A",
        "author": { "name": "Ada", "company": { "country": "FR" } }
    }));
    let grants = || {
        vec![
            AbilityGrant::new(Action::Read, ARTICLE)
                .with_condition(Filter::eq("author.company.country", "FR")),
        ]
    };

    let h = harness(InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()));
    h.service
        .find_one(&ctx_with(grants()), ARTICLE, entry.id, EntityQuery::new())
        .await
        .unwrap();
    assert!(h.entities.last_find_one().unwrap().populate.is_empty());

    let h = harness_with_config(
        InMemoryEntityManager::new().with_entity(ARTICLE, entry.clone()),
        ContentManagerConfig {
            populate_condition_paths: true,
            ..ContentManagerConfig::default()
        },
    );
    h.service
        .find_one(&ctx_with(grants()), ARTICLE, entry.id, EntityQuery::new())
        .await
        .unwrap();
    let populate = h.entities.last_find_one().unwrap().populate;
    assert_eq!(
        populate.node_at(&["author", "company"]).unwrap().fields,
        ["country"]
    );
}

#[tokio::test]
#[traced_test]
async fn denials_are_logged() {
    let h = harness(InMemoryEntityManager::new());

    let result = h
        .service
        .find(&ctx_deny_all(), ARTICLE, EntityQuery::new())
        .await;

    assert!(result.is_err());
    assert!(logs_contain("Access denied"));
}
