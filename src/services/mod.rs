//! Migration passes and the runner that sequences them.

pub mod migration_runner;
pub mod reference_migration;
pub mod schedule_conversion;
pub mod verification;

pub use migration_runner::{MigrationReport, MigrationRunner, TrackerStatus, TRACKER_COLLECTION, TRACKER_ID};
pub use reference_migration::{
    migrate_references, move_scheduled_publishes, move_scheduled_syncs, ReferenceKind, ReferenceReport,
};
pub use schedule_conversion::{convert_schedules, ConversionReport, ConvertedSchedule, ScheduleConverter};
pub use verification::{verify_migration, FieldDefect, VerificationReport};
