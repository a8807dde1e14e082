//! Contract tests run against both document store adapters.

mod common;
mod helpers;

use common::doc;
use helpers::database::setup_test_store;
use pulp_schedule_migrate::adapters::json_dump::{export_dump, import_dump, parse_dump};
use pulp_schedule_migrate::{DocumentStore, FieldUpdate, InMemoryDocumentStore};
use serde_json::json;

async fn exercise_contract(store: &dyn DocumentStore) {
    let calls = store.collection("scheduled_calls");
    assert_eq!(calls.count().await.unwrap(), 0);
    assert!(calls.find(None).await.unwrap().is_empty());

    for id in ["c", "a", "b"] {
        calls
            .save(&doc(json!({"_id": id, "call_count": 0, "tags": ["x"]})))
            .await
            .unwrap();
    }
    // Replacing keeps the original position.
    calls
        .save(&doc(json!({"_id": "c", "total_run_count": 0})))
        .await
        .unwrap();

    let ids: Vec<String> = calls
        .find(None)
        .await
        .unwrap()
        .iter()
        .map(|d| d.display_id())
        .collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
    assert_eq!(calls.count().await.unwrap(), 3);

    let replaced = calls.get("c").await.unwrap().unwrap();
    assert!(!replaced.contains("call_count"));

    let projected = calls.find(Some(&["tags"][..])).await.unwrap();
    assert_eq!(projected[1], doc(json!({"_id": "a", "tags": ["x"]})));

    let update = FieldUpdate::new()
        .set("resource", "pulp:importer:demo:yum")
        .unset("call_count");
    assert!(calls.update_one("a", &update).await.unwrap());
    assert!(!calls.update_one("missing", &update).await.unwrap());
    assert!(calls.get("missing").await.unwrap().is_none());
    assert_eq!(
        calls.get("a").await.unwrap().unwrap(),
        doc(json!({"_id": "a", "tags": ["x"], "resource": "pulp:importer:demo:yum"}))
    );

    let matched = calls
        .update_all(&FieldUpdate::new().unset("tags"))
        .await
        .unwrap();
    assert_eq!(matched, 3);
    for d in calls.find(None).await.unwrap() {
        assert!(!d.contains("tags"));
    }

    // Other collections are unaffected.
    let importers = store.collection("repo_importers");
    assert_eq!(importers.update_all(&FieldUpdate::new().unset("x")).await.unwrap(), 0);
    assert_eq!(store.collection_names().await.unwrap(), vec!["scheduled_calls".to_string()]);
}

#[tokio::test]
async fn test_sqlite_store_contract() {
    let store = setup_test_store().await;
    exercise_contract(&store).await;
}

#[tokio::test]
async fn test_memory_store_contract() {
    let store = InMemoryDocumentStore::new();
    exercise_contract(&store).await;
}

#[tokio::test]
async fn test_nested_values_survive_partial_updates() {
    let store = setup_test_store().await;
    let calls = store.collection("scheduled_calls");
    calls
        .save(&doc(json!({
            "_id": "s1",
            "kwargs": {"overrides": {"relative_url": "a/b", "force": true}},
            "last_updated": 1_390_212_000.5
        })))
        .await
        .unwrap();

    calls
        .update_one(
            "s1",
            &FieldUpdate::new().set("schedule", json!({"type": "interval", "run_every": 3600})),
        )
        .await
        .unwrap();

    let stored = calls.get("s1").await.unwrap().unwrap();
    assert_eq!(
        stored.get("kwargs"),
        Some(&json!({"overrides": {"relative_url": "a/b", "force": true}}))
    );
    assert_eq!(stored.get("last_updated"), Some(&json!(1_390_212_000.5)));
    assert_eq!(
        stored.get("schedule"),
        Some(&json!({"type": "interval", "run_every": 3600}))
    );
}

#[tokio::test]
async fn test_dump_round_trip_through_sqlite() {
    let dump = parse_dump(
        r#"{
            "scheduled_calls": [
                {"_id": {"$oid": "525844f3e19a001d665f97ea"}, "schedule": "2013-10-01T13:00:00Z/P1D"}
            ],
            "repo_distributors": [
                {"_id": "d1", "repo_id": "demo", "id": "iso", "scheduled_publishes": ["525844f3e19a001d665f97ea"]}
            ]
        }"#,
    )
    .unwrap();

    let store = setup_test_store().await;
    assert_eq!(import_dump(&store, &dump).await.unwrap(), 2);

    let schedule = store
        .collection("scheduled_calls")
        .get("525844f3e19a001d665f97ea")
        .await
        .unwrap();
    assert!(schedule.is_some(), "extended-JSON ids are addressable by their hex value");

    let exported = export_dump(&store, &["repo_distributors", "scheduled_calls"])
        .await
        .unwrap();
    assert_eq!(exported, dump);
}
