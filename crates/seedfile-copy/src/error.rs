//! # Design
//!
//! - One error enum for every stage of a copy declaration: filename resolution, endpoints, callbacks.
//! - Boundary crossings wrap the inner error in a stage variant instead of flattening it.
//! - `root_cause` peels the stage wrappers so callers can match on the failure itself.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use seedfile_host::{BoxError, HostError};
use thiserror::Error;

use crate::endpoint::FileField;

/// Result type for copy declarations.
pub type CopyResult<T> = Result<T, CopyError>;

/// Errors produced while resolving a copy declaration.
#[derive(Debug, Error)]
pub enum CopyError {
    /// No copy process was published on the resolution context.
    #[error("copyfile process was not initialized")]
    ProcessNotInitialized,
    /// The process in context has no filename provider for a relative filename.
    #[error("filename provider not set")]
    FilenameProviderMissing {
        /// Role of the filename that needed resolution.
        field: FileField,
    },
    /// The filename provider rejected a relative filename.
    #[error("could not resolve filename")]
    FilenameProvider {
        /// Role of the filename.
        field: FileField,
        /// Filename as written in the declaration.
        filename: String,
        /// Error returned by the provider.
        #[source]
        source: BoxError,
    },
    /// A computed filename resolved to something other than a string.
    #[error("resolved value is not a string (got {observed})")]
    TypeMismatch {
        /// JSON type of the resolved value.
        observed: &'static str,
    },
    /// The deferred value behind a computed filename failed.
    #[error("could not resolve value")]
    ValueResolve {
        /// Underlying pipeline error.
        #[source]
        source: HostError,
    },
    /// Opening a source file failed.
    #[error("could not open file '{}'", .path.display())]
    Open {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Creating a destination file failed.
    #[error("could not create file '{}'", .path.display())]
    Create {
        /// Path that was created.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Reading file metadata failed.
    #[error("error reading file info of '{}'", .path.display())]
    Stat {
        /// Path whose metadata was read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The source stream could not be opened.
    #[error("error reading source")]
    ReadSource {
        /// Endpoint error.
        #[source]
        source: Box<CopyError>,
    },
    /// The destination stream could not be opened.
    #[error("error writing to destination")]
    WriteDestination {
        /// Endpoint error.
        #[source]
        source: Box<CopyError>,
    },
    /// Streaming bytes between the endpoints failed.
    #[error("error copying data from source to destination")]
    CopyData {
        /// Underlying IO error.
        source: io::Error,
    },
    /// The resolution context was cancelled mid-copy.
    #[error("copy cancelled")]
    Cancelled {
        /// Bytes written before cancellation was observed.
        copied: u64,
    },
    /// Neither the value nor the process supplied a resolve callback.
    #[error("no callback found to process copy file result")]
    NoCallback,
    /// A resolve callback failed for its own reasons.
    #[error("resolve callback failed")]
    Callback {
        /// Error reported by the callback.
        #[source]
        source: BoxError,
    },
    /// Resolving the source side of a declaration failed.
    #[error("error resolving source value")]
    ResolveSource {
        /// Source-side error.
        #[source]
        source: Box<CopyError>,
    },
    /// Resolving the destination side of a declaration failed.
    #[error("error resolving destination value")]
    ResolveDestination {
        /// Destination-side error.
        #[source]
        source: Box<CopyError>,
    },
    /// A cached reader replayed a failure recorded on first use.
    #[error("cached reader failure")]
    Cached {
        /// Failure recorded by the cache.
        #[source]
        source: Arc<CopyError>,
    },
}

impl CopyError {
    /// Wrap an arbitrary error raised by a resolve callback.
    pub fn callback(source: impl Into<BoxError>) -> Self {
        Self::Callback {
            source: source.into(),
        }
    }

    /// Innermost copy error beneath the stage wrappers.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::ReadSource { source }
            | Self::WriteDestination { source }
            | Self::ResolveSource { source }
            | Self::ResolveDestination { source } => source.root_cause(),
            Self::Cached { source } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn resolve_source(source: Self) -> Self {
        Self::ResolveSource {
            source: Box::new(source),
        }
    }

    pub(crate) fn resolve_destination(source: Self) -> Self {
        Self::ResolveDestination {
            source: Box::new(source),
        }
    }
}

/// Copy error carried by a pipeline error, if the failing value was a copy declaration.
#[must_use]
pub fn copy_error(err: &HostError) -> Option<&CopyError> {
    match err {
        HostError::Value { source, .. } => source.downcast_ref::<CopyError>(),
        _ => None,
    }
}
