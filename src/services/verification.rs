//! Post-migration integrity checks.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::domain::errors::MigrationResult;
use crate::domain::models::scheduled_call::{fields, legacy};
use crate::domain::models::{ResourceId, ScheduledTask, REMOVED_FIELDS};
use crate::domain::ports::DocumentCollection;

/// A schedule field that failed a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefect {
    pub schedule_id: String,
    pub field: String,
    /// Offending value, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Findings of [`verify_migration`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub schedules_checked: usize,
    /// Schedules with no `resource` after all passes.
    pub missing_resource: Vec<String>,
    /// Schedules whose `resource` is not a known identifier format.
    pub invalid_resource: Vec<FieldDefect>,
    /// Legacy fields that survived conversion.
    pub legacy_fields: Vec<FieldDefect>,
    /// Schedules whose `task` is absent or not canonical.
    pub unknown_tasks: Vec<FieldDefect>,
    /// Parent documents still holding a schedule-id list, as `collection/_id`.
    pub lingering_references: Vec<String>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.missing_resource.is_empty()
            && self.invalid_resource.is_empty()
            && self.legacy_fields.is_empty()
            && self.unknown_tasks.is_empty()
            && self.lingering_references.is_empty()
    }

    pub fn defect_count(&self) -> usize {
        self.missing_resource.len()
            + self.invalid_resource.len()
            + self.legacy_fields.len()
            + self.unknown_tasks.len()
            + self.lingering_references.len()
    }
}

/// Scan the three collections for records the migration left inconsistent.
///
/// Task identifiers must be bare or qualified with `task_prefix`.
/// Read-only; never modifies a document.
#[instrument(skip_all)]
pub async fn verify_migration(
    schedules: &dyn DocumentCollection,
    importers: &dyn DocumentCollection,
    distributors: &dyn DocumentCollection,
    task_prefix: Option<&str>,
) -> MigrationResult<VerificationReport> {
    let mut report = VerificationReport::default();

    for doc in schedules.find(None).await? {
        report.schedules_checked += 1;
        let schedule_id = doc.display_id();

        match doc.get(fields::RESOURCE) {
            None | Some(Value::Null) => report.missing_resource.push(schedule_id.clone()),
            Some(Value::String(resource)) if resource.parse::<ResourceId>().is_ok() => {}
            Some(other) => report.invalid_resource.push(FieldDefect {
                schedule_id: schedule_id.clone(),
                field: fields::RESOURCE.to_string(),
                value: Some(display_value(other)),
            }),
        }

        for field in REMOVED_FIELDS {
            if doc.contains(field) {
                report.legacy_fields.push(FieldDefect {
                    schedule_id: schedule_id.clone(),
                    field: field.to_string(),
                    value: None,
                });
            }
        }

        let task_ok = doc
            .get(fields::TASK)
            .and_then(Value::as_str)
            .is_some_and(|task| ScheduledTask::from_canonical(task, task_prefix).is_some());
        if !task_ok {
            report.unknown_tasks.push(FieldDefect {
                schedule_id,
                field: fields::TASK.to_string(),
                value: doc.get(fields::TASK).map(display_value),
            });
        }
    }

    for (collection, field) in [
        (importers, legacy::SCHEDULED_SYNCS),
        (distributors, legacy::SCHEDULED_PUBLISHES),
    ] {
        for doc in collection.find(Some(&[field][..])).await? {
            if doc.contains(field) {
                report
                    .lingering_references
                    .push(format!("{}/{}", collection.name(), doc.display_id()));
            }
        }
    }

    if report.is_clean() {
        info!(schedules_checked = report.schedules_checked, "verification passed");
    } else {
        warn!(
            schedules_checked = report.schedules_checked,
            missing_resource = report.missing_resource.len(),
            invalid_resource = report.invalid_resource.len(),
            legacy_fields = report.legacy_fields.len(),
            unknown_tasks = report.unknown_tasks.len(),
            lingering_references = report.lingering_references.len(),
            "verification found defects"
        );
    }
    Ok(report)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
