//! `import`: load legacy collections from a JSON dump.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::adapters::json_dump::{import_dump, read_dump};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

use super::open_store;

#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub file: String,
    pub documents: usize,
    pub collections: BTreeMap<String, usize>,
}

impl CommandOutput for ImportOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Imported {} document(s) from {}", self.documents, self.file)];
        for (name, count) in &self.collections {
            lines.push(format!("  {name}: {count}"));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(file: &Path, config: &Config, json_mode: bool) -> Result<()> {
    let dump = read_dump(file)
        .await
        .with_context(|| format!("Failed to read dump {}", file.display()))?;
    let store = open_store(config).await?;
    let documents = import_dump(store.as_ref(), &dump).await?;
    info!(file = %file.display(), documents, "dump imported");

    output(
        &ImportOutput {
            file: file.display().to_string(),
            documents,
            collections: dump.iter().map(|(name, docs)| (name.clone(), docs.len())).collect(),
        },
        json_mode,
    );
    Ok(())
}
