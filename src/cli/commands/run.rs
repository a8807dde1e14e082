//! `run`: apply the migration, or rehearse it with `--dry-run`.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::MigrationReport;

use super::open_runner;
use super::verify::VerifyOutput;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct RunOutput {
    pub report: MigrationReport,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let r = &self.report;
        let mut lines = vec![
            if r.dry_run {
                format!("Dry run {} (nothing was written)", r.run_id)
            } else {
                format!("Migration {} applied (version {})", r.run_id, r.version)
            },
            format!("Duration: {} ms", r.duration_ms),
            String::new(),
            format!("Schedules converted: {}", r.conversion.converted),
            format!("  consumer resources: {}", r.conversion.consumer_resources),
        ];
        for (task, count) in &r.conversion.by_task {
            lines.push(format!("  {task}: {count}"));
        }
        for (label, pass) in [("Importers", &r.importers), ("Distributors", &r.distributors)] {
            lines.push(format!(
                "{label}: {} scanned, {} with schedules, {} schedules tagged, {} dangling",
                pass.parents_scanned, pass.parents_with_schedules, pass.schedules_tagged, pass.dangling
            ));
        }
        if let Some(ref verification) = r.verification {
            lines.push(String::new());
            lines.push(VerifyOutput::from(verification.clone()).to_human());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(dry_run: bool, config: &Config, json_mode: bool) -> Result<()> {
    let runner = open_runner(config).await?;
    let report = if dry_run {
        runner.dry_run().await.context("Dry run failed")?
    } else {
        runner
            .run()
            .await
            .context("Migration failed; restore the pre-migration snapshot before retrying")?
    };
    output(&RunOutput { report }, json_mode);
    Ok(())
}
