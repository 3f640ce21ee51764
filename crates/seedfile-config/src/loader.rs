//! Loading configuration documents from disk, strings, and the environment.
//!
//! # Design
//! - Parse, then overlay environment overrides, then validate; callers never see an unvalidated document.
//! - Environment access goes through a lookup function so overrides are testable without touching process state.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::SeedfileConfig;
use crate::validate::validate;

/// Overrides the source filename root.
pub const ENV_SOURCE_ROOT: &str = "SEEDFILE_SOURCE_ROOT";
/// Overrides the destination filename root.
pub const ENV_DESTINATION_ROOT: &str = "SEEDFILE_DESTINATION_ROOT";
/// Overrides the log level.
pub const ENV_LOG_LEVEL: &str = "SEEDFILE_LOG_LEVEL";

/// Parse a configuration document without applying overrides.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the document does not match the model.
pub fn from_json_str(document: &str) -> ConfigResult<SeedfileConfig> {
    serde_json::from_str(document).map_err(|source| ConfigError::Parse {
        origin: "inline".to_string(),
        source,
    })
}

/// Read and parse a configuration document without applying overrides.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read and
/// [`ConfigError::Parse`] when its content does not match the model.
pub fn load_from_path(path: &Path) -> ConfigResult<SeedfileConfig> {
    let document = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&document).map_err(|source| ConfigError::Parse {
        origin: path.display().to_string(),
        source,
    })
}

/// Overlay overrides found through `lookup` onto `config`.
pub fn apply_overrides(config: &mut SeedfileConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(root) = non_empty(lookup(ENV_SOURCE_ROOT)) {
        debug!(variable = ENV_SOURCE_ROOT, root = %root, "source root overridden");
        config.roots.source = Some(PathBuf::from(root));
    }
    if let Some(root) = non_empty(lookup(ENV_DESTINATION_ROOT)) {
        debug!(variable = ENV_DESTINATION_ROOT, root = %root, "destination root overridden");
        config.roots.destination = Some(PathBuf::from(root));
    }
    if let Some(level) = non_empty(lookup(ENV_LOG_LEVEL)) {
        config.logging.level = level;
    }
}

/// Overlay overrides from the process environment onto `config`.
pub fn apply_env_overrides(config: &mut SeedfileConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

/// Load the effective configuration.
///
/// Reads `path` when given (defaults otherwise), applies environment
/// overrides, and validates the result.
///
/// # Errors
///
/// Returns an error when the document cannot be read, parsed, or validated.
pub fn load(path: Option<&Path>) -> ConfigResult<SeedfileConfig> {
    let mut config = match path {
        Some(path) => load_from_path(path)?,
        None => SeedfileConfig::default(),
    };
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_replace_roots_and_level() -> ConfigResult<()> {
        let mut config = from_json_str(r#"{"roots": {"source": "/fixtures"}}"#)?;
        let env = HashMap::from([
            (ENV_DESTINATION_ROOT, "/out".to_string()),
            (ENV_LOG_LEVEL, "debug".to_string()),
            (ENV_SOURCE_ROOT, String::new()),
        ]);
        apply_overrides(&mut config, |name| env.get(name).cloned());

        assert_eq!(config.roots.source, Some(PathBuf::from("/fixtures")));
        assert_eq!(config.roots.destination, Some(PathBuf::from("/out")));
        assert_eq!(config.logging.level, "debug");
        Ok(())
    }

    #[test]
    fn inline_parse_errors_report_origin() {
        let err = from_json_str("{").err();
        assert!(matches!(
            err,
            Some(ConfigError::Parse { ref origin, .. }) if origin == "inline"
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_from_path(Path::new("/definitely/missing/seedfile.json")).err();
        assert!(matches!(err, Some(ConfigError::Io { .. })));
    }
}
