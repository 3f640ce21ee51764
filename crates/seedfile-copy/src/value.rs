//! The copy declaration stored in a field of a fixture row.
//!
//! # Design
//! - The source resolves first; the destination is not attempted until the source is ready.
//! - A callback on the declaration wins over the process default.
//! - The field itself is never written; callbacks decide which row values change.

use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use seedfile_host::{
    HostError, HostResult, Readiness, ResolveContext, ResolvedData, TableId, Value,
    ValueDependencies, ValuesMutable,
};
use tracing::{debug, warn};

use crate::context::from_context;
use crate::endpoint::{FileDestination, FileSource, ResolveScope};
use crate::error::{CopyError, CopyResult};
use crate::resolve::{ResolveCallback, ResolveRequest};

/// Optional settings of a [`CopyValue`].
#[derive(Clone, Default)]
pub struct ValueOptions {
    /// Caller metadata, readable by callbacks and filename providers.
    pub info: Option<Arc<dyn Any + Send + Sync>>,
    /// Callback that overrides the process default for this declaration.
    pub resolve_callback: Option<ResolveCallback>,
}

/// Field value that copies a file from a source to a destination when resolved.
#[derive(Clone)]
pub struct CopyValue {
    source: Arc<dyn FileSource>,
    destination: Arc<dyn FileDestination>,
    info: Option<Arc<dyn Any + Send + Sync>>,
    resolve_callback: Option<ResolveCallback>,
}

impl CopyValue {
    /// Declaration copying `source` into `destination`.
    #[must_use]
    pub fn new(
        source: impl FileSource + 'static,
        destination: impl FileDestination + 'static,
    ) -> Self {
        Self::from_shared(Arc::new(source), Arc::new(destination))
    }

    /// Declaration over endpoints that are already shared.
    #[must_use]
    pub fn from_shared(source: Arc<dyn FileSource>, destination: Arc<dyn FileDestination>) -> Self {
        Self {
            source,
            destination,
            info: None,
            resolve_callback: None,
        }
    }

    /// Apply an options record.
    #[must_use]
    pub fn with_options(mut self, options: ValueOptions) -> Self {
        if options.info.is_some() {
            self.info = options.info;
        }
        if options.resolve_callback.is_some() {
            self.resolve_callback = options.resolve_callback;
        }
        self
    }

    /// Attach caller metadata.
    #[must_use]
    pub fn with_info<T: Any + Send + Sync>(mut self, info: T) -> Self {
        self.info = Some(Arc::new(info));
        self
    }

    /// Set a callback for this declaration only.
    #[must_use]
    pub fn with_resolve_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ResolveRequest<'_>) -> CopyResult<()> + Send + Sync + 'static,
    {
        self.resolve_callback = Some(Arc::new(callback));
        self
    }

    /// Caller metadata, when present and of type `T`.
    #[must_use]
    pub fn info<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.info.as_deref().and_then(|info| info.downcast_ref::<T>())
    }

    /// Callback set on this declaration, if any.
    #[must_use]
    pub const fn resolve_callback(&self) -> Option<&ResolveCallback> {
        self.resolve_callback.as_ref()
    }

    /// Resolve both endpoints and hand them to the effective callback.
    ///
    /// Returns `Later` without touching the destination when the source is not ready,
    /// and `Later` without running any callback when the destination is not ready.
    ///
    /// # Errors
    ///
    /// Returns [`CopyError::ResolveSource`] or [`CopyError::ResolveDestination`] when an
    /// endpoint fails, [`CopyError::NoCallback`] when no callback applies, and the
    /// callback's own error otherwise.
    pub fn resolve_copy(
        &self,
        ctx: &ResolveContext,
        resolved_data: &ResolvedData,
        table_id: &TableId,
        field_name: &str,
        values: &mut dyn ValuesMutable,
    ) -> CopyResult<Readiness<()>> {
        let scope = ResolveScope {
            ctx,
            resolved_data,
            table_id,
            field_name,
            values: &*values,
            value: self,
        };

        let Readiness::Ready(reader) = self
            .source
            .resolve_source(&scope)
            .map_err(CopyError::resolve_source)?
        else {
            debug!(table = %table_id, field = field_name, "copy source not ready");
            return Ok(Readiness::Later);
        };
        let Readiness::Ready(writer) = self
            .destination
            .resolve_destination(&scope)
            .map_err(CopyError::resolve_destination)?
        else {
            debug!(table = %table_id, field = field_name, "copy destination not ready");
            return Ok(Readiness::Later);
        };

        let process = from_context(ctx);
        let (callback, origin) = match (&self.resolve_callback, process.as_deref()) {
            (Some(callback), _) => (callback, "value"),
            (None, Some(process)) => (
                process.resolve_callback().ok_or(CopyError::NoCallback)?,
                "process",
            ),
            (None, None) => return Err(CopyError::NoCallback),
        };
        debug!(
            table = %table_id,
            field = field_name,
            source = %reader,
            destination = %writer,
            callback = origin,
            "copy endpoints ready"
        );

        let mut request = ResolveRequest {
            ctx,
            resolved_data,
            table_id,
            field_name,
            values,
            value: self,
            reader: reader.as_ref(),
            writer: writer.as_ref(),
        };
        callback(&mut request).inspect_err(|err| {
            warn!(
                table = %table_id,
                field = field_name,
                source = %reader,
                destination = %writer,
                error = %err,
                "copy callback failed"
            );
        })?;
        Ok(Readiness::Ready(()))
    }
}

impl Value for CopyValue {
    fn resolve(
        &self,
        ctx: &ResolveContext,
        resolved_data: &ResolvedData,
        table_id: &TableId,
        field_name: &str,
        values: &mut dyn ValuesMutable,
    ) -> HostResult<Readiness<()>> {
        self.resolve_copy(ctx, resolved_data, table_id, field_name, values)
            .map_err(|err| HostError::value(table_id, field_name, err))
    }
}

impl ValueDependencies for CopyValue {
    fn table_dependencies(&self) -> Vec<TableId> {
        let mut tables = self.source.table_dependencies();
        tables.extend(self.destination.table_dependencies());
        tables
    }
}

impl Debug for CopyValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CopyValue")
            .field("info", &self.info.is_some())
            .field("resolve_callback", &self.resolve_callback.is_some())
            .finish_non_exhaustive()
    }
}
