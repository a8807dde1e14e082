//! Reference migration: hoist the schedule-id lists kept on importers and
//! distributors into a `resource` back-reference on each schedule.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{MigrationError, MigrationResult};
use crate::domain::models::document::json_type_name;
use crate::domain::models::scheduled_call::{fields, legacy, parent};
use crate::domain::models::{Document, FieldUpdate, ResourceId};
use crate::domain::ports::DocumentCollection;

/// Which parent collection a pass reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Importer,
    Distributor,
}

impl ReferenceKind {
    /// Name of the legacy schedule-id list on the parent document.
    pub fn legacy_field(self) -> &'static str {
        match self {
            Self::Importer => legacy::SCHEDULED_SYNCS,
            Self::Distributor => legacy::SCHEDULED_PUBLISHES,
        }
    }

    pub fn resource_for(self, repo_id: &str, child_id: &str) -> ResourceId {
        match self {
            Self::Importer => ResourceId::importer(repo_id, child_id),
            Self::Distributor => ResourceId::distributor(repo_id, child_id),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Importer => "importer",
            Self::Distributor => "distributor",
        }
    }
}

/// Counters for one reference pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceReport {
    pub parents_scanned: usize,
    pub parents_with_schedules: usize,
    pub schedules_tagged: usize,
    /// Listed ids with no matching schedule.
    pub dangling: usize,
    /// Parents that carried the legacy field, null included, before it was unset.
    pub legacy_fields_removed: usize,
}

/// Tag every schedule listed on a parent with that parent's resource id,
/// then drop the legacy list from all parents.
///
/// Every parent is validated before the first write, so a parent with a
/// malformed list or key fails the pass with nothing tagged. Unknown schedule
/// ids are skipped unless `strict` is set, in which case the first one aborts
/// the pass with [`MigrationError::DanglingReference`].
#[instrument(skip_all, fields(kind = kind.as_str(), parents = %parents.name()))]
pub async fn migrate_references(
    kind: ReferenceKind,
    parents: &dyn DocumentCollection,
    schedules: &dyn DocumentCollection,
    strict: bool,
) -> MigrationResult<ReferenceReport> {
    let legacy_field = kind.legacy_field();
    let projection = [legacy_field, parent::REPO_ID, parent::ID];
    let mut report = ReferenceReport::default();

    let docs = parents.find(Some(&projection[..])).await?;
    let mut plan = Vec::new();
    for doc in &docs {
        report.parents_scanned += 1;
        if doc.contains(legacy_field) {
            report.legacy_fields_removed += 1;
        }
        let Some(schedule_ids) = schedule_ids(doc, legacy_field)? else {
            continue;
        };
        let resource = kind
            .resource_for(
                parent_key(doc, parent::REPO_ID)?,
                parent_key(doc, parent::ID)?,
            )
            .to_string();
        plan.push((resource, schedule_ids));
    }
    report.parents_with_schedules = plan.len();

    for (resource, schedule_ids) in plan {
        let update = FieldUpdate::new().set(fields::RESOURCE, resource.as_str());
        for schedule_id in schedule_ids {
            if schedules.update_one(schedule_id, &update).await? {
                debug!(schedule_id, resource = %resource, "tagged schedule");
                report.schedules_tagged += 1;
            } else if strict {
                return Err(MigrationError::DanglingReference {
                    resource,
                    schedule_id: schedule_id.to_string(),
                });
            } else {
                warn!(schedule_id, resource = %resource, "skipping reference to missing schedule");
                report.dangling += 1;
            }
        }
    }

    parents
        .update_all(&FieldUpdate::new().unset(legacy_field))
        .await?;

    info!(
        parents_scanned = report.parents_scanned,
        schedules_tagged = report.schedules_tagged,
        dangling = report.dangling,
        legacy_fields_removed = report.legacy_fields_removed,
        "{} reference pass complete",
        kind.as_str()
    );
    Ok(report)
}

/// Importer pass: `scheduled_syncs` → `pulp:importer:<repo_id>:<id>`.
pub async fn move_scheduled_syncs(
    importers: &dyn DocumentCollection,
    schedules: &dyn DocumentCollection,
    strict: bool,
) -> MigrationResult<ReferenceReport> {
    migrate_references(ReferenceKind::Importer, importers, schedules, strict).await
}

/// Distributor pass: `scheduled_publishes` → `pulp:distributor:<repo_id>:<id>`.
pub async fn move_scheduled_publishes(
    distributors: &dyn DocumentCollection,
    schedules: &dyn DocumentCollection,
    strict: bool,
) -> MigrationResult<ReferenceReport> {
    migrate_references(ReferenceKind::Distributor, distributors, schedules, strict).await
}

/// The legacy id list, or `None` when it is absent or null.
fn schedule_ids<'a>(doc: &'a Document, field: &str) -> MigrationResult<Option<Vec<&'a str>>> {
    let record = doc.display_id();
    match doc.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(ids)) => ids
            .iter()
            .map(|id| {
                id.as_str().ok_or_else(|| {
                    MigrationError::invalid(
                        &record,
                        field,
                        format!("schedule id must be a string, found {}", json_type_name(id)),
                    )
                })
            })
            .collect::<MigrationResult<Vec<_>>>()
            .map(Some),
        Some(other) => Err(MigrationError::invalid(
            &record,
            field,
            format!("expected a list, found {}", json_type_name(other)),
        )),
    }
}

fn parent_key<'a>(doc: &'a Document, field: &str) -> MigrationResult<&'a str> {
    match doc.get(field) {
        Some(Value::String(value)) if value.is_empty() => {
            Err(MigrationError::invalid(&doc.display_id(), field, "must not be empty"))
        }
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(MigrationError::invalid(
            &doc.display_id(),
            field,
            format!("expected a string, found {}", json_type_name(other)),
        )),
        None => Err(MigrationError::missing(&doc.display_id(), field)),
    }
}
