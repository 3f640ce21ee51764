//! Error types surfaced by the resolution contracts.
//!
//! # Design
//! - Constant messages; the offending field, table, or template travels in variant fields.
//! - Adapter failures are boxed so any value implementation can report through one type.

use std::error::Error as StdError;

use thiserror::Error;

use crate::data::TableId;

/// Boxed error used at trait-object boundaries.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias for resolution contracts.
pub type HostResult<T> = Result<T, HostError>;

/// Errors raised while resolving field values.
#[derive(Debug, Error)]
pub enum HostError {
    /// A format string or template could not be rendered.
    #[error("value format failed")]
    Format {
        /// Format string or template that failed.
        format: String,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// A referenced field was absent from a resolved row.
    #[error("referenced field missing")]
    MissingField {
        /// Table owning the row.
        table: TableId,
        /// Field that was expected.
        field: String,
    },
    /// A field value adapter failed.
    #[error("field value resolution failed")]
    Value {
        /// Table owning the row being resolved.
        table: TableId,
        /// Field whose value failed.
        field: String,
        /// Underlying adapter error.
        #[source]
        source: BoxError,
    },
}

impl HostError {
    /// Wrap an adapter error raised while resolving `field` of `table`.
    pub fn value(table: &TableId, field: &str, source: impl Into<BoxError>) -> Self {
        Self::Value {
            table: table.clone(),
            field: field.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn format(format: &str, reason: &'static str) -> Self {
        Self::Format {
            format: format.to_string(),
            reason,
        }
    }
}
