//! Domain models for scheduled-call documents and their related records.

pub mod config;
pub mod document;
pub mod interval;
pub mod resource;
pub mod scheduled_call;
pub mod task_name;
pub mod timestamp;

pub use config::{Config, DatabaseConfig, LogFormat, LoggingConfig, MigrationSettings, PayloadEncoding, RotationPolicy};
pub use document::{Document, FieldUpdate, ID_FIELD};
pub use interval::{IntervalParseError, IsoDuration, IsoInterval};
pub use resource::{ResourceId, ResourceParseError, CONSUMER_TAG_PREFIX};
pub use scheduled_call::{RecurrenceRule, MIGRATION_VERSION, REMOVED_FIELDS};
pub use task_name::ScheduledTask;
