//! Default values for configuration documents.
//!
//! # Design
//! - Keep copy tuning bounds next to the default so validation and docs agree.

/// Default chunk size used when streaming bytes between endpoints.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
/// Smallest accepted chunk size.
pub const MIN_BUFFER_SIZE: usize = 1024;
/// Largest accepted chunk size.
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;
/// Default log level when neither the document nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub(crate) const fn buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

pub(crate) fn log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
