//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

use std::process::ExitCode;

pub use types::{Cli, Commands};

use crate::domain::errors::MigrationError;

/// Print a command failure and pick the process exit code.
///
/// The full context chain is printed so the offending record id reaches the
/// operator.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ExitCode {
    let status = exit_status(&err);
    let already_applied = status == ALREADY_APPLIED_STATUS;

    if json_mode {
        let causes: Vec<String> = err.chain().map(ToString::to_string).collect();
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": causes,
            "already_applied": already_applied,
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }

    ExitCode::from(status)
}

/// Exit status used when the database was migrated before.
pub const ALREADY_APPLIED_STATUS: u8 = 3;

fn exit_status(err: &anyhow::Error) -> u8 {
    let already_applied = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<MigrationError>(),
            Some(MigrationError::AlreadyApplied { .. })
        )
    });
    if already_applied {
        ALREADY_APPLIED_STATUS
    } else {
        1
    }
}
