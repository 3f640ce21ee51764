//! Typed configuration models.
//!
//! # Design
//! - Unknown keys are rejected so typos in fixture settings surface immediately.
//! - Every section has defaults; an empty document is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Root configuration document for a copy process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedfileConfig {
    /// Directories used to resolve relative filenames.
    pub roots: FilenameRoots,
    /// Byte-copy tuning.
    pub copy: CopySettings,
    /// Logging output settings.
    pub logging: LoggingSettings,
}

/// Base directories for relative source and destination filenames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilenameRoots {
    /// Directory that relative source filenames are read from.
    pub source: Option<PathBuf>,
    /// Directory that relative destination filenames are written to.
    pub destination: Option<PathBuf>,
    /// Whether relative filenames may contain `..` components.
    pub allow_parent_traversal: bool,
}

/// Tuning for the default byte copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopySettings {
    /// Chunk size in bytes; cancellation is checked between chunks.
    pub buffer_size: usize,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            buffer_size: defaults::buffer_size(),
        }
    }
}

/// Output format for log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormatSetting {
    /// Pretty output in debug builds, JSON in release builds.
    #[default]
    Auto,
    /// Structured JSON records.
    Json,
    /// Human-readable records.
    Pretty,
}

impl LogFormatSetting {
    /// Setting as it appears in configuration documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

/// Logging output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Log level or `EnvFilter` directive.
    pub level: String,
    /// Output format.
    pub format: LogFormatSetting,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            format: LogFormatSetting::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() -> Result<(), serde_json::Error> {
        let config: SeedfileConfig = serde_json::from_str("{}")?;
        assert_eq!(config, SeedfileConfig::default());
        assert_eq!(config.copy.buffer_size, defaults::DEFAULT_BUFFER_SIZE);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormatSetting::Auto);
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = serde_json::from_str::<SeedfileConfig>(r#"{"roots": {"src": "/tmp"}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn log_format_round_trips_through_snake_case() -> Result<(), serde_json::Error> {
        let settings: LoggingSettings =
            serde_json::from_str(r#"{"level": "debug", "format": "json"}"#)?;
        assert_eq!(settings.format, LogFormatSetting::Json);
        assert_eq!(settings.format.as_str(), "json");
        Ok(())
    }
}
