use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for the migration tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Migration behaviour
    #[serde(default)]
    pub migration: MigrationSettings,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    "pulp-migrate.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// `sqlx` connection URL for the configured path.
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for log files (optional, if None logs only to stderr)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Enable console logging
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    Daily,
    Hourly,
    #[default]
    Never,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::default(),
        }
    }
}

/// Settings for the conversion and reference passes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MigrationSettings {
    /// Collection holding scheduled calls
    #[serde(default = "default_schedules_collection")]
    pub schedules_collection: String,

    /// Collection holding repository importers
    #[serde(default = "default_importers_collection")]
    pub importers_collection: String,

    /// Collection holding repository distributors
    #[serde(default = "default_distributors_collection")]
    pub distributors_collection: String,

    /// Fail when an importer or distributor lists a schedule that does not exist
    #[serde(default)]
    pub strict_references: bool,

    /// Run the importer and distributor passes concurrently
    #[serde(default)]
    pub parallel_reference_passes: bool,

    /// Verify the collections after a successful run
    #[serde(default = "default_true")]
    pub verify_after_run: bool,

    /// Dotted module prefix for task identifiers, e.g. `pulp.server.tasks`
    #[serde(default)]
    pub task_prefix: Option<String>,

    /// Encoding of the `args`/`kwargs` blobs inside legacy call requests
    #[serde(default)]
    pub payload_codec: PayloadEncoding,
}

/// How legacy call arguments were serialized.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    /// Python pickle, as written by the legacy server
    #[default]
    Pickle,
    Json,
}

fn default_schedules_collection() -> String {
    "scheduled_calls".to_string()
}

fn default_importers_collection() -> String {
    "repo_importers".to_string()
}

fn default_distributors_collection() -> String {
    "repo_distributors".to_string()
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            schedules_collection: default_schedules_collection(),
            importers_collection: default_importers_collection(),
            distributors_collection: default_distributors_collection(),
            strict_references: false,
            parallel_reference_passes: false,
            verify_after_run: true,
            task_prefix: None,
            payload_codec: PayloadEncoding::default(),
        }
    }
}
