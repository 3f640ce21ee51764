//! Filename providers map relative filenames to filesystem paths.
//!
//! # Design
//! - Providers are plain closures so embedders can plug any policy in.
//! - `RootedFilenameProvider` is the configured policy: one root directory per role.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use seedfile_config::FilenameRoots;
use seedfile_host::{BoxError, ResolveContext, TableId};
use thiserror::Error;

use crate::endpoint::FileField;
use crate::value::CopyValue;

/// Inputs handed to a filename provider.
#[derive(Clone, Copy)]
pub struct FilenameRequest<'a> {
    /// Context of the current pipeline run.
    pub ctx: &'a ResolveContext,
    /// Role of the filename.
    pub field: FileField,
    /// Declaration holding the filename; its `info` is caller metadata.
    pub value: &'a CopyValue,
    /// Table owning the row.
    pub table_id: &'a TableId,
    /// Relative filename as written in the declaration.
    pub filename: &'a str,
}

/// Maps a relative filename to the path that is actually opened.
pub type FilenameProvider =
    Arc<dyn Fn(&FilenameRequest<'_>) -> Result<PathBuf, BoxError> + Send + Sync>;

/// Failures of [`RootedFilenameProvider`].
#[derive(Debug, Error)]
pub enum RootedFilenameError {
    /// No root is configured for the filename's role.
    #[error("no filename root configured")]
    RootMissing {
        /// Role without a root.
        field: FileField,
    },
    /// Relative declarations must not carry absolute paths.
    #[error("filename is absolute")]
    Absolute {
        /// Offending filename.
        filename: String,
    },
    /// The filename would escape its root.
    #[error("filename escapes its root")]
    ParentTraversal {
        /// Offending filename.
        filename: String,
    },
}

/// Resolves relative filenames beneath per-role root directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootedFilenameProvider {
    source: Option<PathBuf>,
    destination: Option<PathBuf>,
    allow_parent_traversal: bool,
}

impl RootedFilenameProvider {
    /// Provider rooted at `source` and `destination`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(source.into()),
            destination: Some(destination.into()),
            allow_parent_traversal: false,
        }
    }

    /// Provider built from configured roots.
    #[must_use]
    pub fn from_roots(roots: &FilenameRoots) -> Self {
        Self {
            source: roots.source.clone(),
            destination: roots.destination.clone(),
            allow_parent_traversal: roots.allow_parent_traversal,
        }
    }

    /// Allow or reject `..` components in relative filenames.
    #[must_use]
    pub const fn with_parent_traversal(mut self, allow: bool) -> Self {
        self.allow_parent_traversal = allow;
        self
    }

    /// Root directory used for `field`.
    #[must_use]
    pub fn root(&self, field: FileField) -> Option<&Path> {
        match field {
            FileField::Source => self.source.as_deref(),
            FileField::Destination => self.destination.as_deref(),
        }
    }

    /// Join `filename` beneath the root of `field`.
    ///
    /// # Errors
    ///
    /// Returns an error when no root is configured for `field`, when
    /// `filename` is absolute, or when it climbs out of the root.
    pub fn resolve(
        &self,
        field: FileField,
        filename: &str,
    ) -> Result<PathBuf, RootedFilenameError> {
        let root = self
            .root(field)
            .ok_or(RootedFilenameError::RootMissing { field })?;
        let relative = Path::new(filename);
        if relative.has_root() {
            return Err(RootedFilenameError::Absolute {
                filename: filename.to_string(),
            });
        }
        if !self.allow_parent_traversal
            && relative
                .components()
                .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(RootedFilenameError::ParentTraversal {
                filename: filename.to_string(),
            });
        }
        Ok(root.join(relative))
    }

    /// Convert into a provider closure for a copy process.
    #[must_use]
    pub fn into_provider(self) -> FilenameProvider {
        Arc::new(move |request: &FilenameRequest<'_>| {
            self.resolve(request.field, request.filename)
                .map_err(BoxError::from)
        })
    }
}
