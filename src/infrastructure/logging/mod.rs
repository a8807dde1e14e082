//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty console output on stderr
//! - Optional JSON file output with rotation via tracing-appender

pub mod logger;

pub use logger::LoggerImpl;
