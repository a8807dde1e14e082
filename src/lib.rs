//! pulp-schedule-migrate - scheduled-call schema migration
//!
//! Converts legacy scheduled-call documents into the new schedule shape and
//! moves the schedule-id lists kept on repository importers and distributors
//! into a `resource` back-reference on each schedule.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): document model, schedule field layout, task
//!   table, interval notation and the store/codec ports
//! - **Service Layer** (`services`): the conversion and reference passes,
//!   verification and the run-once migration runner
//! - **Adapters** (`adapters`): SQLite and in-memory document stores, codecs,
//!   JSON dump import/export
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pulp_schedule_migrate::{MigrationRunner, MigrationSettings, SqliteDocumentStore};
//!
//! async fn migrate(pool: sqlx::SqlitePool) -> anyhow::Result<()> {
//!     let store = Arc::new(SqliteDocumentStore::new(pool));
//!     let report = MigrationRunner::new(store, MigrationSettings::default()).run().await?;
//!     println!("converted {} schedules", report.conversion.converted);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{InMemoryDocumentStore, SqliteDocumentStore};
pub use domain::errors::{MigrationError, MigrationResult, StoreError, StoreResult};
pub use domain::models::{
    Config, DatabaseConfig, Document, FieldUpdate, IsoDuration, IsoInterval, LoggingConfig,
    MigrationSettings, PayloadEncoding, ResourceId, ScheduledTask, MIGRATION_VERSION,
};
pub use domain::ports::{DocumentCollection, DocumentStore, PayloadCodec, RecurrenceCodec};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    convert_schedules, move_scheduled_publishes, move_scheduled_syncs, verify_migration,
    MigrationReport, MigrationRunner, ScheduleConverter,
};
