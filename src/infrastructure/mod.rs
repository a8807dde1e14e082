//! Infrastructure layer module
//!
//! Process-level concerns that sit outside the migration passes:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)

pub mod config;
pub mod logging;
