//! `status`: show the migration tracker.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, MIGRATION_VERSION};
use crate::services::TrackerStatus;

use super::open_runner;

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub migration_version: i64,
    pub applied: bool,
    pub schedules_collection: String,
    #[serde(flatten)]
    pub tracker: TrackerStatus,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        if !self.applied {
            return format!(
                "Migration {} is pending for collection '{}'.",
                self.migration_version, self.schedules_collection
            );
        }
        let mut lines = vec![format!("Migration {} has been applied.", self.migration_version)];
        if let Some(applied_at) = self.tracker.applied_at {
            lines.push(format!("Applied at: {}", applied_at.to_rfc3339()));
        }
        if let Some(ref run_id) = self.tracker.run_id {
            lines.push(format!("Run: {run_id}"));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let runner = open_runner(config).await?;
    let tracker = runner.status().await?;
    output(
        &StatusOutput {
            migration_version: MIGRATION_VERSION,
            applied: tracker.is_applied(),
            schedules_collection: config.migration.schedules_collection.clone(),
            tracker,
        },
        json_mode,
    );
    Ok(())
}
