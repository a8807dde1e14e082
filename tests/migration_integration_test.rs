//! End-to-end migration against the SQLite document store.

mod common;
mod helpers;

use std::sync::Arc;

use common::{distributor, importer, legacy_schedule, seed_legacy_database, DISTRIBUTORS, IMPORTERS, SCHEDULES};
use helpers::database::{open_file_store, setup_file_store, setup_test_store};
use pulp_schedule_migrate::adapters::IntervalRecurrenceCodec;
use pulp_schedule_migrate::domain::models::REMOVED_FIELDS;
use pulp_schedule_migrate::services::{convert_schedules, ScheduleConverter};
use pulp_schedule_migrate::{
    DocumentStore, IsoDuration, MigrationError, MigrationRunner, MigrationSettings, RecurrenceCodec,
    ScheduledTask, MIGRATION_VERSION,
};
use serde_json::{json, Value};

#[tokio::test]
async fn test_every_schedule_is_tagged_after_all_passes() {
    let store = Arc::new(setup_test_store().await);
    seed_legacy_database(store.as_ref()).await;

    let report = MigrationRunner::new(store.clone(), MigrationSettings::default())
        .run()
        .await
        .expect("migration should succeed");

    assert_eq!(report.conversion.converted, 3);
    assert!(report.verification.as_ref().is_some_and(|v| v.is_clean()));

    let schedules = store.collection(SCHEDULES).find(None).await.unwrap();
    assert_eq!(schedules.len(), 3);
    for schedule in &schedules {
        let resource = schedule.get("resource").and_then(Value::as_str);
        assert!(resource.is_some(), "{} has no resource", schedule.display_id());

        for field in REMOVED_FIELDS {
            assert!(!schedule.contains(field), "{field} survived on {}", schedule.display_id());
        }

        let task = schedule.get("task").and_then(Value::as_str).unwrap();
        assert!(ScheduledTask::from_canonical(task, None).is_some(), "unexpected task {task}");
    }

    let by_id = |id: &str| schedules.iter().find(|s| s.id() == Some(id)).unwrap().clone();
    assert_eq!(
        by_id("sync-demo").get("resource"),
        Some(&json!("pulp:importer:demo:puppet_importer"))
    );
    assert_eq!(
        by_id("publish-demo").get("resource"),
        Some(&json!("pulp:distributor:demo:puppet_distributor"))
    );
    assert_eq!(
        by_id("install-host1").get("resource"),
        Some(&json!("pulp:consumer:host1"))
    );
}

#[tokio::test]
async fn test_converted_fields_on_sqlite() {
    let store = Arc::new(setup_test_store().await);
    seed_legacy_database(store.as_ref()).await;
    MigrationRunner::new(store.clone(), MigrationSettings::default())
        .run()
        .await
        .unwrap();

    let schedules = store.collection(SCHEDULES);
    let publish = schedules.get("publish-demo").await.unwrap().unwrap();
    assert_eq!(publish.get("total_run_count"), Some(&json!(1)));
    assert_eq!(publish.get("iso_schedule"), Some(&json!("2013-10-01T13:00:00Z/P1D")));
    assert_eq!(
        publish.get("schedule"),
        Some(&IntervalRecurrenceCodec.encode(&IsoDuration::days(1)))
    );
    assert_eq!(publish.get("args"), Some(&json!(["demo"])));
    assert_eq!(publish.get("kwargs"), Some(&json!({"overrides": {}})));
    assert_eq!(publish.get("first_run"), Some(&json!("2013-10-01T13:00:00+00:00")));
    assert_eq!(publish.get("last_run_at"), Some(&Value::Null));
    assert_eq!(publish.get("task"), Some(&json!("repository.publish")));
    assert!(publish.get("last_updated").is_some_and(Value::is_f64));
    assert_eq!(publish.get("enabled"), Some(&json!(true)));

    let sync = schedules.get("sync-demo").await.unwrap().unwrap();
    assert_eq!(sync.get("last_run_at"), Some(&json!("2013-10-05T01:00:00+00:00")));
    assert_eq!(sync.get("iso_schedule"), Some(&json!("2013-10-01T13:00:00Z/PT12H")));

    let install = schedules.get("install-host1").await.unwrap().unwrap();
    assert_eq!(install.get("iso_schedule"), Some(&json!("R3/2013-10-01T13:00:00Z/P1W")));
    assert_eq!(install.get("task"), Some(&json!("consumer.install_content")));
}

#[tokio::test]
async fn test_parent_lists_are_removed_everywhere() {
    let store = Arc::new(setup_test_store().await);
    seed_legacy_database(store.as_ref()).await;
    let report = MigrationRunner::new(store.clone(), MigrationSettings::default())
        .run()
        .await
        .unwrap();

    assert_eq!(report.importers.parents_scanned, 2);
    assert_eq!(report.importers.parents_with_schedules, 1);
    assert_eq!(report.importers.legacy_fields_removed, 2);
    assert_eq!(report.distributors.schedules_tagged, 1);

    for doc in store.collection(IMPORTERS).find(None).await.unwrap() {
        assert!(!doc.contains("scheduled_syncs"));
        assert!(doc.contains("importer_type_id"));
    }
    for doc in store.collection(DISTRIBUTORS).find(None).await.unwrap() {
        assert!(!doc.contains("scheduled_publishes"));
        assert_eq!(doc.get("auto_publish"), Some(&json!(false)));
    }
}

#[tokio::test]
async fn test_unknown_task_halts_and_leaves_record_unmodified() {
    let store = Arc::new(setup_test_store().await);
    let bad = legacy_schedule(
        "bad",
        "repo_sync_itinerary",
        "2013-10-01T13:00:00Z/P1D",
        &[],
        Value::Null,
    );
    store.collection(SCHEDULES).save(&bad).await.unwrap();

    let runner = MigrationRunner::new(store.clone(), MigrationSettings::default());
    match runner.run().await {
        Err(MigrationError::UnknownTask { record, name }) => {
            assert_eq!(record, "bad");
            assert_eq!(name, "repo_sync_itinerary");
        }
        other => panic!("expected UnknownTask, got {other:?}"),
    }

    let stored = store.collection(SCHEDULES).get("bad").await.unwrap().unwrap();
    assert_eq!(stored, bad);
    assert!(!runner.status().await.unwrap().is_applied());
}

#[tokio::test]
async fn test_second_conversion_pass_detects_converted_records() {
    let store = setup_test_store().await;
    seed_legacy_database(&store).await;
    let schedules = store.collection(SCHEDULES);
    let converter = ScheduleConverter::default();

    convert_schedules(schedules.as_ref(), &converter).await.unwrap();
    match convert_schedules(schedules.as_ref(), &converter).await {
        Err(MigrationError::MissingField { field, .. }) => assert_eq!(field, "call_count"),
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_once_guard_on_file_database() {
    let (_dir, config, store) = setup_file_store().await;
    let store = Arc::new(store);
    seed_legacy_database(store.as_ref()).await;

    MigrationRunner::new(store.clone(), MigrationSettings::default())
        .run()
        .await
        .unwrap();
    store.pool().close().await;

    // Reopen the same file: the tracker must survive.
    let reopened = Arc::new(open_file_store(&config).await);
    let runner = MigrationRunner::new(reopened, MigrationSettings::default());
    let status = runner.status().await.unwrap();
    assert_eq!(status.version, Some(MIGRATION_VERSION));
    assert!(status.applied_at.is_some());
    assert!(matches!(
        runner.run().await,
        Err(MigrationError::AlreadyApplied { version: MIGRATION_VERSION })
    ));
}

#[tokio::test]
async fn test_dry_run_on_sqlite_writes_nothing() {
    let store = Arc::new(setup_test_store().await);
    seed_legacy_database(store.as_ref()).await;
    let before = store.collection(SCHEDULES).find(None).await.unwrap();

    let runner = MigrationRunner::new(store.clone(), MigrationSettings::default());
    let report = runner.dry_run().await.unwrap();
    assert!(report.dry_run);
    assert!(report.verification.unwrap().is_clean());

    assert_eq!(store.collection(SCHEDULES).find(None).await.unwrap(), before);
    assert!(store.collection(IMPORTERS).get("imp-1").await.unwrap().unwrap().contains("scheduled_syncs"));
    assert!(!runner.status().await.unwrap().is_applied());
}

#[tokio::test]
async fn test_parallel_passes_on_sqlite() {
    let store = Arc::new(setup_test_store().await);
    seed_legacy_database(store.as_ref()).await;
    let settings = MigrationSettings {
        parallel_reference_passes: true,
        ..MigrationSettings::default()
    };

    let report = MigrationRunner::new(store.clone(), settings).run().await.unwrap();
    assert!(report.verification.unwrap().is_clean());
}

#[tokio::test]
async fn test_dangling_references() {
    let store = Arc::new(setup_test_store().await);
    seed_legacy_database(store.as_ref()).await;
    store
        .collection(DISTRIBUTORS)
        .save(&distributor("dist-2", "old", "iso_distributor", json!(["deleted-long-ago"])))
        .await
        .unwrap();

    let strict = MigrationSettings {
        strict_references: true,
        ..MigrationSettings::default()
    };
    let dry = MigrationRunner::new(store.clone(), strict).dry_run().await;
    assert!(matches!(dry, Err(MigrationError::DanglingReference { .. })));

    let report = MigrationRunner::new(store.clone(), MigrationSettings::default())
        .run()
        .await
        .unwrap();
    assert_eq!(report.distributors.dangling, 1);
    assert!(store.collection(SCHEDULES).get("deleted-long-ago").await.unwrap().is_none());
    let dist = store.collection(DISTRIBUTORS).get("dist-2").await.unwrap().unwrap();
    assert!(!dist.contains("scheduled_publishes"));
}

#[tokio::test]
async fn test_schedule_without_owner_fails_verification() {
    let store = Arc::new(setup_test_store().await);
    store
        .collection(SCHEDULES)
        .save(&legacy_schedule(
            "orphan",
            "publish_itinerary",
            "2013-10-01T13:00:00Z/P1D",
            &[],
            Value::Null,
        ))
        .await
        .unwrap();
    store
        .collection(IMPORTERS)
        .save(&importer("imp-1", "demo", "yum_importer", json!([])))
        .await
        .unwrap();

    let runner = MigrationRunner::new(store.clone(), MigrationSettings::default());
    let report = runner.run().await.unwrap();
    let verification = report.verification.unwrap();
    assert_eq!(verification.missing_resource, vec!["orphan".to_string()]);
    assert_eq!(runner.verify().await.unwrap(), verification);
}
