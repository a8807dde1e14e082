//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pulp-schedule-migrate")]
#[command(about = "Convert legacy scheduled calls into resource-tagged schedules", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to pulp-migrate.yaml plus overrides)
    #[arg(short, long, global = true, env = "PULP_MIGRATE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the migration against the configured database
    Run {
        /// Run on an in-memory copy and report without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Check converted collections for integrity defects
    Verify,

    /// Show whether the migration has been applied
    Status,

    /// Load a JSON dump of legacy collections into the database
    Import {
        /// Dump file: an object mapping collection names to document arrays
        file: PathBuf,
    },

    /// Write the migration's collections to a JSON dump
    Export {
        /// Destination file
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_global_flags() {
        let cli = Cli::try_parse_from(["pulp-schedule-migrate", "run", "--dry-run", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Run { dry_run: true }));
    }

    #[test]
    fn test_parse_import_with_config() {
        let cli = Cli::try_parse_from([
            "pulp-schedule-migrate",
            "--config",
            "/etc/pulp/migrate.yaml",
            "import",
            "dump.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/pulp/migrate.yaml")));
        match cli.command {
            Commands::Import { file } => assert_eq!(file, PathBuf::from("dump.json")),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
