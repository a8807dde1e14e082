//! `verify`: report schedules and parents the migration left inconsistent.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{bullet_list, output, CommandOutput};
use crate::domain::models::Config;
use crate::services::{FieldDefect, VerificationReport};

use super::open_runner;

const SHOWN_PER_SECTION: usize = 20;

#[derive(Debug, Serialize)]
pub struct VerifyOutput {
    pub clean: bool,
    pub defects: usize,
    #[serde(flatten)]
    pub report: VerificationReport,
}

impl From<VerificationReport> for VerifyOutput {
    fn from(report: VerificationReport) -> Self {
        Self {
            clean: report.is_clean(),
            defects: report.defect_count(),
            report,
        }
    }
}

fn describe(defects: &[FieldDefect]) -> Vec<String> {
    defects
        .iter()
        .map(|d| match d.value {
            Some(ref value) => format!("{} {} = {value}", d.schedule_id, d.field),
            None => format!("{} {}", d.schedule_id, d.field),
        })
        .collect()
}

impl CommandOutput for VerifyOutput {
    fn to_human(&self) -> String {
        let r = &self.report;
        if self.clean {
            return format!("Verification passed: {} schedule(s) checked.", r.schedules_checked);
        }

        let mut lines = vec![format!(
            "Verification found {} defect(s) across {} schedule(s):",
            self.defects, r.schedules_checked
        )];
        lines.extend(bullet_list("Schedules without resource", &r.missing_resource, SHOWN_PER_SECTION));
        lines.extend(bullet_list(
            "Unrecognised resources",
            &describe(&r.invalid_resource),
            SHOWN_PER_SECTION,
        ));
        lines.extend(bullet_list("Legacy fields", &describe(&r.legacy_fields), SHOWN_PER_SECTION));
        lines.extend(bullet_list("Unknown tasks", &describe(&r.unknown_tasks), SHOWN_PER_SECTION));
        lines.extend(bullet_list(
            "Parents with schedule lists",
            &r.lingering_references,
            SHOWN_PER_SECTION,
        ));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Returns whether the collections are clean.
pub async fn execute(config: &Config, json_mode: bool) -> Result<bool> {
    let runner = open_runner(config).await?;
    let report = runner.verify().await?;
    let out = VerifyOutput::from(report);
    output(&out, json_mode);
    Ok(out.clean)
}
