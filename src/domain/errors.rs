//! Domain errors for the scheduled-call migration.

use thiserror::Error;

/// Errors raised by document store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid document in {collection}: {reason}")]
    InvalidDocument { collection: String, reason: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Schema migration {version} failed: {reason}")]
    Schema { version: i64, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Errors that abort the migration.
///
/// Every record-level variant carries the `_id` of the offending document so
/// the operator can find it in the restored snapshot.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Record {record}: mandatory field '{field}' is missing")]
    MissingField { record: String, field: String },

    #[error("Record {record}: field '{field}' is invalid: {reason}")]
    InvalidField {
        record: String,
        field: String,
        reason: String,
    },

    #[error("Record {record}: malformed schedule '{schedule}': {reason}")]
    MalformedSchedule {
        record: String,
        schedule: String,
        reason: String,
    },

    #[error("Record {record}: failed to decode '{field}': {reason}")]
    PayloadDecode {
        record: String,
        field: String,
        reason: String,
    },

    #[error("Record {record}: unknown task name '{name}'")]
    UnknownTask { record: String, name: String },

    #[error("Schedule {schedule_id} referenced by {resource} does not exist")]
    DanglingReference { resource: String, schedule_id: String },

    #[error("Migration version {version} has already been applied to this database")]
    AlreadyApplied { version: i64 },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type MigrationResult<T> = Result<T, MigrationError>;

impl MigrationError {
    pub(crate) fn missing(record: &str, field: impl Into<String>) -> Self {
        Self::MissingField {
            record: record.to_string(),
            field: field.into(),
        }
    }

    pub(crate) fn invalid(record: &str, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            record: record.to_string(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error stems from a single bad record rather than the store.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::InvalidField { .. }
                | Self::MalformedSchedule { .. }
                | Self::PayloadDecode { .. }
                | Self::UnknownTask { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_names_record_and_field() {
        let err = MigrationError::missing("abc123", "call_count");
        assert_eq!(
            err.to_string(),
            "Record abc123: mandatory field 'call_count' is missing"
        );
        assert!(err.is_record_error());
    }

    #[test]
    fn test_store_errors_are_not_record_errors() {
        let err = MigrationError::from(StoreError::Connection("gone".to_string()));
        assert!(!err.is_record_error());
        assert!(!MigrationError::AlreadyApplied { version: 7 }.is_record_error());
    }
}
