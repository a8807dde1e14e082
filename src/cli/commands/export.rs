//! `export`: snapshot the migration's collections to a JSON dump.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::adapters::json_dump::export_dump;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

use super::open_store;

#[derive(Debug, Serialize)]
pub struct ExportOutput {
    pub file: String,
    pub documents: usize,
}

impl CommandOutput for ExportOutput {
    fn to_human(&self) -> String {
        format!("Exported {} document(s) to {}", self.documents, self.file)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(file: &Path, config: &Config, json_mode: bool) -> Result<()> {
    let store = open_store(config).await?;
    let settings = &config.migration;
    let dump = export_dump(
        store.as_ref(),
        &[
            settings.schedules_collection.as_str(),
            settings.importers_collection.as_str(),
            settings.distributors_collection.as_str(),
        ],
    )
    .await?;

    let text = serde_json::to_string_pretty(&dump)?;
    tokio::fs::write(file, text)
        .await
        .with_context(|| format!("Failed to write {}", file.display()))?;

    output(
        &ExportOutput {
            file: file.display().to_string(),
            documents: dump.values().map(Vec::len).sum(),
        },
        json_mode,
    );
    Ok(())
}
