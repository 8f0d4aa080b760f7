//! Shared tracing/logging setup.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{LOG_FORMAT_ENV, LogFormat, init};
