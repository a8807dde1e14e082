//! Domain layer for the scheduled-call migration
//!
//! Document shapes, the fixed task table, resource identifiers and the
//! ports the migration passes depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{MigrationError, MigrationResult, StoreError, StoreResult};
