//! CLI command implementations.

pub mod export;
pub mod import;
pub mod run;
pub mod status;
pub mod verify;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::sqlite::initialize_database;
use crate::adapters::SqliteDocumentStore;
use crate::domain::models::Config;
use crate::services::MigrationRunner;

/// Open the configured database, creating the schema on first use.
pub async fn open_store(config: &Config) -> Result<Arc<SqliteDocumentStore>> {
    let pool = initialize_database(&config.database)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;
    Ok(Arc::new(SqliteDocumentStore::new(pool)))
}

/// Runner over the configured database.
pub async fn open_runner(config: &Config) -> Result<MigrationRunner> {
    let store = open_store(config).await?;
    Ok(MigrationRunner::new(store, config.migration.clone()))
}
