//! Orchestration of the three migration passes.
//!
//! The runner owns the run-once guard: a tracker document records the
//! applied migration version and is written only after every pass has
//! succeeded. A dry run copies the affected collections into memory and runs
//! the same pipeline there.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::adapters::InMemoryDocumentStore;
use crate::domain::errors::{MigrationError, MigrationResult};
use crate::domain::models::timestamp::{format_iso8601, parse_datetime_str};
use crate::domain::models::{Document, MigrationSettings, MIGRATION_VERSION};
use crate::domain::ports::DocumentStore;

use super::reference_migration::{move_scheduled_publishes, move_scheduled_syncs, ReferenceReport};
use super::schedule_conversion::{convert_schedules, ConversionReport, ScheduleConverter};
use super::verification::{verify_migration, VerificationReport};

/// Collection holding migration tracker documents.
pub const TRACKER_COLLECTION: &str = "migration_trackers";
/// `_id` of this migration's tracker document.
pub const TRACKER_ID: &str = "scheduled_call_conversion";

/// Outcome of a complete (or dry) run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub dry_run: bool,
    pub version: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub conversion: ConversionReport,
    pub importers: ReferenceReport,
    pub distributors: ReferenceReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationReport>,
}

/// What the tracker says about this database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerStatus {
    /// Highest applied version, if the tracker exists.
    pub version: Option<i64>,
    pub applied_at: Option<DateTime<Utc>>,
    pub run_id: Option<String>,
}

impl TrackerStatus {
    pub fn is_applied(&self) -> bool {
        self.version.is_some_and(|v| v >= MIGRATION_VERSION)
    }
}

/// Runs the scheduled-call migration against a document store.
pub struct MigrationRunner {
    store: Arc<dyn DocumentStore>,
    settings: MigrationSettings,
    converter: ScheduleConverter,
}

impl MigrationRunner {
    pub fn new(store: Arc<dyn DocumentStore>, settings: MigrationSettings) -> Self {
        let converter = ScheduleConverter::from_settings(&settings);
        Self {
            store,
            settings,
            converter,
        }
    }

    /// Replace the converter, e.g. to plug in other codecs.
    pub fn with_converter(mut self, converter: ScheduleConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn settings(&self) -> &MigrationSettings {
        &self.settings
    }

    /// Run all passes against the store and record the migration as applied.
    ///
    /// Fails with [`MigrationError::AlreadyApplied`] before touching any
    /// document when the tracker already records this version.
    #[instrument(skip(self), fields(version = MIGRATION_VERSION))]
    pub async fn run(&self) -> MigrationResult<MigrationReport> {
        self.ensure_pending().await?;
        let run_id = Uuid::new_v4();
        info!(%run_id, "starting scheduled call migration");

        let report = self
            .execute(self.store.as_ref(), run_id, false, self.settings.verify_after_run)
            .await
            .inspect_err(|err| {
                if err.is_record_error() {
                    error!(%run_id, error = %err, "record could not be migrated, database is partially converted");
                }
            })?;
        self.record_applied(&report).await?;

        info!(%run_id, duration_ms = report.duration_ms, "scheduled call migration applied");
        Ok(report)
    }

    /// Run all passes plus verification on an in-memory copy of the store.
    ///
    /// The store itself is left untouched and no tracker is written.
    #[instrument(skip(self))]
    pub async fn dry_run(&self) -> MigrationResult<MigrationReport> {
        self.ensure_pending().await?;
        let run_id = Uuid::new_v4();
        info!(%run_id, "starting dry run");

        let names = [
            self.settings.schedules_collection.as_str(),
            self.settings.importers_collection.as_str(),
            self.settings.distributors_collection.as_str(),
        ];
        let snapshot = InMemoryDocumentStore::snapshot_of(self.store.as_ref(), &names).await?;
        self.execute(&snapshot, run_id, true, true).await
    }

    /// Check the store for migration defects without changing it.
    pub async fn verify(&self) -> MigrationResult<VerificationReport> {
        verify_in(self.store.as_ref(), &self.settings).await
    }

    /// Read the tracker document.
    pub async fn status(&self) -> MigrationResult<TrackerStatus> {
        let tracker = self.store.collection(TRACKER_COLLECTION).get(TRACKER_ID).await?;
        Ok(tracker.map_or(
            TrackerStatus {
                version: None,
                applied_at: None,
                run_id: None,
            },
            |doc| TrackerStatus {
                version: doc.get("version").and_then(Value::as_i64),
                applied_at: doc
                    .get("applied_at")
                    .and_then(Value::as_str)
                    .and_then(|s| parse_datetime_str(s).ok()),
                run_id: doc.get("run_id").and_then(Value::as_str).map(str::to_string),
            },
        ))
    }

    async fn ensure_pending(&self) -> MigrationResult<()> {
        let status = self.status().await?;
        match status.version {
            Some(version) if status.is_applied() => Err(MigrationError::AlreadyApplied { version }),
            _ => Ok(()),
        }
    }

    async fn execute(
        &self,
        store: &dyn DocumentStore,
        run_id: Uuid,
        dry_run: bool,
        verify: bool,
    ) -> MigrationResult<MigrationReport> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let schedules = store.collection(&self.settings.schedules_collection);
        let importers = store.collection(&self.settings.importers_collection);
        let distributors = store.collection(&self.settings.distributors_collection);
        let strict = self.settings.strict_references;

        let conversion = convert_schedules(schedules.as_ref(), &self.converter).await?;

        let (importer_report, distributor_report) = if self.settings.parallel_reference_passes {
            futures::future::try_join(
                move_scheduled_syncs(importers.as_ref(), schedules.as_ref(), strict),
                move_scheduled_publishes(distributors.as_ref(), schedules.as_ref(), strict),
            )
            .await?
        } else {
            let importer_report = move_scheduled_syncs(importers.as_ref(), schedules.as_ref(), strict).await?;
            let distributor_report =
                move_scheduled_publishes(distributors.as_ref(), schedules.as_ref(), strict).await?;
            (importer_report, distributor_report)
        };

        let verification = if verify {
            Some(verify_in(store, &self.settings).await?)
        } else {
            None
        };

        Ok(MigrationReport {
            run_id,
            dry_run,
            version: MIGRATION_VERSION,
            started_at,
            finished_at: Utc::now(),
            duration_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
            conversion,
            importers: importer_report,
            distributors: distributor_report,
            verification,
        })
    }

    async fn record_applied(&self, report: &MigrationReport) -> MigrationResult<()> {
        let mut tracker = Document::with_id(TRACKER_ID);
        tracker.insert("version", json!(report.version));
        tracker.insert("applied_at", json!(format_iso8601(&report.finished_at)));
        tracker.insert("run_id", json!(report.run_id.to_string()));
        self.store.collection(TRACKER_COLLECTION).save(&tracker).await?;
        Ok(())
    }
}

async fn verify_in(store: &dyn DocumentStore, settings: &MigrationSettings) -> MigrationResult<VerificationReport> {
    verify_migration(
        store.collection(&settings.schedules_collection).as_ref(),
        store.collection(&settings.importers_collection).as_ref(),
        store.collection(&settings.distributors_collection).as_ref(),
        settings.task_prefix.as_deref(),
    )
    .await
}
