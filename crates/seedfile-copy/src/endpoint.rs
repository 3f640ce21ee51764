//! Contracts between copy declarations and the endpoints that move bytes.
//!
//! # Design
//! - Sources and destinations turn a declaration into an endpoint; endpoints open streams only on request.
//! - Optional capabilities (`filename`, `table_dependencies`) are default methods, opted into per type.
//! - Endpoints implement `Display` so every log line can name what it touched.

use std::fmt::{self, Display, Formatter};
use std::fs::Metadata;
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::SystemTime;

use seedfile_host::{Readiness, ResolveContext, ResolvedData, TableId, ValuesMutable};

use crate::error::CopyResult;
use crate::value::CopyValue;

/// Byte stream opened by a [`FileReader`]; dropping it releases the handle.
pub type ReadStream = Box<dyn Read + Send>;

/// Byte stream opened by a [`FileWriter`]; dropping it releases the handle.
pub type WriteStream = Box<dyn Write + Send>;

/// Role of a filename within a copy declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileField {
    /// The file bytes are read from.
    Source,
    /// The file bytes are written to.
    Destination,
}

impl FileField {
    /// Stable label for logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Destination => "destination",
        }
    }
}

impl Display for FileField {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Metadata of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Size in bytes.
    pub len: u64,
    /// Last modification time, when the platform reports one.
    pub modified: Option<SystemTime>,
    /// Whether the file is marked read-only.
    pub read_only: bool,
}

impl FileInfo {
    /// Capture the fields of interest from filesystem metadata.
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
            read_only: metadata.permissions().readonly(),
        }
    }
}

/// Readable endpoint of a copy.
pub trait FileReader: Display + Send + Sync {
    /// Open a fresh byte stream positioned at the start of the data.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying data cannot be opened.
    fn new_reader(&self, ctx: &ResolveContext) -> CopyResult<ReadStream>;

    /// Metadata of the data, or `None` when the endpoint has no file behind it.
    ///
    /// # Errors
    ///
    /// Returns an error when the metadata exists but cannot be read.
    fn file_info(&self, ctx: &ResolveContext) -> CopyResult<Option<FileInfo>>;

    /// Filename as written in the declaration, when the endpoint has one.
    fn filename(&self) -> Option<&str> {
        None
    }
}

impl<T: FileReader + ?Sized> FileReader for Arc<T> {
    fn new_reader(&self, ctx: &ResolveContext) -> CopyResult<ReadStream> {
        (**self).new_reader(ctx)
    }

    fn file_info(&self, ctx: &ResolveContext) -> CopyResult<Option<FileInfo>> {
        (**self).file_info(ctx)
    }

    fn filename(&self) -> Option<&str> {
        (**self).filename()
    }
}

/// Writable endpoint of a copy.
pub trait FileWriter: Display + Send + Sync {
    /// Open a fresh byte stream that replaces any existing data.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination cannot be created.
    fn new_writer(&self, ctx: &ResolveContext) -> CopyResult<WriteStream>;

    /// Filename as written in the declaration, when the endpoint has one.
    fn filename(&self) -> Option<&str> {
        None
    }
}

/// Everything a source or destination may consult while resolving.
#[derive(Clone, Copy)]
pub struct ResolveScope<'a> {
    /// Context of the current pipeline run.
    pub ctx: &'a ResolveContext,
    /// Rows resolved so far.
    pub resolved_data: &'a ResolvedData,
    /// Table owning the row.
    pub table_id: &'a TableId,
    /// Field holding the copy declaration.
    pub field_name: &'a str,
    /// Current values of the row.
    pub values: &'a dyn ValuesMutable,
    /// Declaration being resolved.
    pub value: &'a CopyValue,
}

/// Where a copy reads from.
pub trait FileSource: Send + Sync {
    /// Resolve the reader for `scope`, or `Later` when an input is not known yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the source can never be resolved.
    fn resolve_source(
        &self,
        scope: &ResolveScope<'_>,
    ) -> CopyResult<Readiness<Box<dyn FileReader>>>;

    /// Tables that must be resolved before this source.
    fn table_dependencies(&self) -> Vec<TableId> {
        Vec::new()
    }
}

/// Where a copy writes to.
pub trait FileDestination: Send + Sync {
    /// Resolve the writer for `scope`, or `Later` when an input is not known yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination can never be resolved.
    fn resolve_destination(
        &self,
        scope: &ResolveScope<'_>,
    ) -> CopyResult<Readiness<Box<dyn FileWriter>>>;

    /// Tables that must be resolved before this destination.
    fn table_dependencies(&self) -> Vec<TableId> {
        Vec::new()
    }
}
