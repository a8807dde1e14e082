//! Common test utilities for integration tests
//!
//! Legacy document fixtures shaped like the records found in real
//! pre-upgrade databases.

#![allow(dead_code)]

use pulp_schedule_migrate::{Document, DocumentStore};
use serde_json::{json, Value};

pub const SCHEDULES: &str = "scheduled_calls";
pub const IMPORTERS: &str = "repo_importers";
pub const DISTRIBUTORS: &str = "repo_distributors";

/// Build a document from a JSON literal.
pub fn doc(value: Value) -> Document {
    Document::try_from(value).expect("fixture must be a JSON object")
}

/// A legacy scheduled call.
pub fn legacy_schedule(
    id: &str,
    callable_name: &str,
    schedule: &str,
    tags: &[&str],
    last_run: Value,
) -> Document {
    doc(json!({
        "_id": id,
        "id": id,
        "serialized_call_request": {
            "tags": tags,
            "args": "(lp0\nVdemo\np1\na.",
            "kwargs": "(dp0\nS'overrides'\np1\n(dp2\ns.",
            "callable_name": callable_name,
            "principal": "(dp0\nS'login'\np1\nS'admin'\np2\ns.",
            "weight": 0
        },
        "schedule": schedule,
        "first_run": {"$date": "2013-10-01T13:00:00Z"},
        "next_run": {"$date": "2013-10-02T13:00:00Z"},
        "last_run": last_run,
        "remaining_runs": null,
        "enabled": true,
        "consecutive_failures": 0,
        "failure_threshold": null,
        "call_exit_states": ["finished"],
        "call_count": 1
    }))
}

pub fn importer(id: &str, repo_id: &str, importer_id: &str, scheduled_syncs: Value) -> Document {
    doc(json!({
        "_id": id,
        "repo_id": repo_id,
        "id": importer_id,
        "importer_type_id": importer_id,
        "config": {},
        "scheduled_syncs": scheduled_syncs
    }))
}

pub fn distributor(id: &str, repo_id: &str, distributor_id: &str, scheduled_publishes: Value) -> Document {
    doc(json!({
        "_id": id,
        "repo_id": repo_id,
        "id": distributor_id,
        "distributor_type_id": distributor_id,
        "auto_publish": false,
        "scheduled_publishes": scheduled_publishes
    }))
}

/// Seed a store with one schedule of each kind plus their parents.
///
/// - `sync-demo`: listed on the demo importer
/// - `publish-demo`: listed on the demo distributor
/// - `install-host1`: consumer schedule tagged `pulp:consumer:host1`
pub async fn seed_legacy_database(store: &dyn DocumentStore) {
    let schedules = store.collection(SCHEDULES);
    for schedule in [
        legacy_schedule(
            "sync-demo",
            "sync_with_auto_publish_itinerary",
            "2013-10-01T13:00:00Z/PT12H",
            &["pulp:repository:demo", "pulp:action:sync"],
            json!({"$date": "2013-10-05T01:00:00Z"}),
        ),
        legacy_schedule(
            "publish-demo",
            "publish_itinerary",
            "2013-10-01T13:00:00Z/P1D",
            &["pulp:schedule:abc"],
            Value::Null,
        ),
        legacy_schedule(
            "install-host1",
            "consumer_content_install_itinerary",
            "R3/2013-10-01T13:00:00Z/P1W",
            &["pulp:action:unit_install", "pulp:consumer:host1"],
            Value::Null,
        ),
    ] {
        schedules.save(&schedule).await.expect("seed schedule");
    }

    store
        .collection(IMPORTERS)
        .save(&importer("imp-1", "demo", "puppet_importer", json!(["sync-demo"])))
        .await
        .expect("seed importer");
    store
        .collection(IMPORTERS)
        .save(&importer("imp-2", "zoo", "yum_importer", Value::Null))
        .await
        .expect("seed importer");
    store
        .collection(DISTRIBUTORS)
        .save(&distributor("dist-1", "demo", "puppet_distributor", json!(["publish-demo"])))
        .await
        .expect("seed distributor");
}
