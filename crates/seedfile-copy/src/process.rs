//! The copy process: pipeline-wide settings shared by every copy declaration.
//!
//! # Design
//! - Starting the process only publishes it on the context; no files are touched.
//! - Settings are immutable once started so concurrent rows observe the same policy.

use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

use seedfile_config::SeedfileConfig;
use seedfile_config::defaults::DEFAULT_BUFFER_SIZE;
use seedfile_host::{BoxError, HostResult, Process, ResolveContext};
use tracing::debug;

use crate::context::to_context;
use crate::endpoint::{FileField, ResolveScope};
use crate::error::{CopyError, CopyResult};
use crate::provider::{FilenameProvider, FilenameRequest, RootedFilenameProvider};
use crate::resolve::{ResolveCallback, ResolveRequest, resolve_copy_file};

/// Optional settings of a [`CopyProcess`].
#[derive(Clone, Default)]
pub struct ProcessOptions {
    /// Callback run for declarations that carry none of their own.
    pub resolve_callback: Option<ResolveCallback>,
    /// Maps relative filenames to paths.
    pub filename_provider: Option<FilenameProvider>,
}

/// Pipeline-wide copy settings, published on the context by [`Process::start`].
#[derive(Clone)]
pub struct CopyProcess {
    options: ProcessOptions,
    buffer_size: usize,
}

impl Default for CopyProcess {
    fn default() -> Self {
        Self {
            options: ProcessOptions::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl CopyProcess {
    /// Process without callback or filename provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process configured from an options record.
    #[must_use]
    pub fn with_options(options: ProcessOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Process configured from loaded configuration.
    ///
    /// Installs the stock copy callback and, when any root is configured, a
    /// [`RootedFilenameProvider`].
    #[must_use]
    pub fn from_config(config: &SeedfileConfig) -> Self {
        let mut process = Self::new()
            .with_resolve_callback(resolve_copy_file)
            .with_buffer_size(config.copy.buffer_size);
        if config.roots.source.is_some() || config.roots.destination.is_some() {
            process.options.filename_provider =
                Some(RootedFilenameProvider::from_roots(&config.roots).into_provider());
        }
        process
    }

    /// Set the default resolve callback.
    #[must_use]
    pub fn with_resolve_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ResolveRequest<'_>) -> CopyResult<()> + Send + Sync + 'static,
    {
        self.options.resolve_callback = Some(Arc::new(callback));
        self
    }

    /// Set the filename provider.
    #[must_use]
    pub fn with_filename_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&FilenameRequest<'_>) -> Result<PathBuf, BoxError> + Send + Sync + 'static,
    {
        self.options.filename_provider = Some(Arc::new(provider));
        self
    }

    /// Set the chunk size used by the stock copy callback. Zero keeps the current size.
    #[must_use]
    pub const fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        if buffer_size > 0 {
            self.buffer_size = buffer_size;
        }
        self
    }

    /// Default resolve callback, if any.
    #[must_use]
    pub const fn resolve_callback(&self) -> Option<&ResolveCallback> {
        self.options.resolve_callback.as_ref()
    }

    /// Filename provider, if any.
    #[must_use]
    pub const fn filename_provider(&self) -> Option<&FilenameProvider> {
        self.options.filename_provider.as_ref()
    }

    /// Chunk size used by the stock copy callback.
    #[must_use]
    pub const fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub(crate) fn resolve_filename(
        &self,
        scope: &ResolveScope<'_>,
        field: FileField,
        filename: &str,
    ) -> CopyResult<PathBuf> {
        let provider = self
            .filename_provider()
            .ok_or(CopyError::FilenameProviderMissing { field })?;
        let request = FilenameRequest {
            ctx: scope.ctx,
            field,
            value: scope.value,
            table_id: scope.table_id,
            filename,
        };
        let path = provider(&request).map_err(|source| CopyError::FilenameProvider {
            field,
            filename: filename.to_string(),
            source,
        })?;
        debug!(%field, filename, path = %path.display(), "filename resolved");
        Ok(path)
    }
}

impl Process for CopyProcess {
    fn start(&self, ctx: ResolveContext) -> HostResult<ResolveContext> {
        Ok(to_context(&ctx, Arc::new(self.clone())))
    }

    fn finish(&self, _ctx: &ResolveContext) -> HostResult<()> {
        Ok(())
    }
}

impl Debug for CopyProcess {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CopyProcess")
            .field("resolve_callback", &self.options.resolve_callback.is_some())
            .field("filename_provider", &self.options.filename_provider.is_some())
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}
