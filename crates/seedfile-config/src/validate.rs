//! Validation helpers for configuration documents.

use std::path::Path;

use tracing::warn;

use crate::defaults::{MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{CopySettings, FilenameRoots, LoggingSettings, SeedfileConfig};

/// Validate a configuration document.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for the first invalid field found.
pub fn validate(config: &SeedfileConfig) -> ConfigResult<()> {
    validate_roots(&config.roots)?;
    validate_copy(config.copy)?;
    validate_logging(&config.logging)
}

fn validate_roots(roots: &FilenameRoots) -> ConfigResult<()> {
    check_root("source", roots.source.as_deref())?;
    check_root("destination", roots.destination.as_deref())
}

fn check_root(field: &'static str, root: Option<&Path>) -> ConfigResult<()> {
    let Some(root) = root else {
        return Ok(());
    };
    if root.as_os_str().is_empty() {
        return Err(ConfigError::invalid("roots", field, None, "empty"));
    }
    if root.is_relative() {
        warn!(
            field,
            root = %root.display(),
            "filename root is relative; it resolves against the working directory"
        );
    }
    Ok(())
}

fn validate_copy(copy: CopySettings) -> ConfigResult<()> {
    if copy.buffer_size < MIN_BUFFER_SIZE {
        return Err(ConfigError::invalid(
            "copy",
            "buffer_size",
            Some(copy.buffer_size.to_string()),
            "too_small",
        ));
    }
    if copy.buffer_size > MAX_BUFFER_SIZE {
        return Err(ConfigError::invalid(
            "copy",
            "buffer_size",
            Some(copy.buffer_size.to_string()),
            "too_large",
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingSettings) -> ConfigResult<()> {
    if logging.level.trim().is_empty() {
        return Err(ConfigError::invalid("logging", "level", None, "empty"));
    }
    Ok(())
}
