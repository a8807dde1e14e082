//! Field layout of scheduled-call documents before and after conversion.

use serde::{Deserialize, Serialize};

use super::interval::IsoDuration;

/// Version number this conversion occupies in the migration sequence.
pub const MIGRATION_VERSION: i64 = 7;

/// Fields of the legacy scheduled-call shape.
pub mod legacy {
    pub const CALL_EXIT_STATES: &str = "call_exit_states";
    pub const CALL_COUNT: &str = "call_count";
    pub const SCHEDULE: &str = "schedule";
    pub const SERIALIZED_CALL_REQUEST: &str = "serialized_call_request";
    pub const NEXT_RUN: &str = "next_run";
    pub const FIRST_RUN: &str = "first_run";
    pub const LAST_RUN: &str = "last_run";

    /// Fields of the embedded call request.
    pub mod call_request {
        pub const ARGS: &str = "args";
        pub const KWARGS: &str = "kwargs";
        pub const PRINCIPAL: &str = "principal";
        pub const CALLABLE_NAME: &str = "callable_name";
        pub const TAGS: &str = "tags";
    }

    /// Legacy schedule-id list on importer documents.
    pub const SCHEDULED_SYNCS: &str = "scheduled_syncs";
    /// Legacy schedule-id list on distributor documents.
    pub const SCHEDULED_PUBLISHES: &str = "scheduled_publishes";
}

/// Fields of the converted scheduled-call shape.
pub mod fields {
    pub const TOTAL_RUN_COUNT: &str = "total_run_count";
    pub const ISO_SCHEDULE: &str = "iso_schedule";
    pub const SCHEDULE: &str = "schedule";
    pub const ARGS: &str = "args";
    pub const KWARGS: &str = "kwargs";
    pub const PRINCIPAL: &str = "principal";
    pub const FIRST_RUN: &str = "first_run";
    pub const LAST_RUN_AT: &str = "last_run_at";
    pub const TASK: &str = "task";
    pub const LAST_UPDATED: &str = "last_updated";
    pub const RESOURCE: &str = "resource";
}

/// Identifier fields on importer and distributor documents.
pub mod parent {
    pub const REPO_ID: &str = "repo_id";
    pub const ID: &str = "id";
}

/// Legacy fields that must not survive conversion.
pub const REMOVED_FIELDS: [&str; 5] = [
    legacy::CALL_EXIT_STATES,
    legacy::CALL_COUNT,
    legacy::NEXT_RUN,
    legacy::SERIALIZED_CALL_REQUEST,
    legacy::LAST_RUN,
];

/// Fixed-period recurrence consumed by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub run_every_secs: u64,
    /// Whether runs are aligned to the period boundary rather than the last run.
    pub relative: bool,
}

impl RecurrenceRule {
    pub fn every(period: &IsoDuration) -> Self {
        Self {
            run_every_secs: period.total_seconds(),
            relative: false,
        }
    }
}
