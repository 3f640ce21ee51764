//! Resolve callbacks and the stock byte copy.
//!
//! # Design
//! - A callback receives both endpoints once they are ready and decides what "resolving" means.
//! - The stock callback streams source bytes into the destination in fixed-size chunks.
//! - Cancellation is observed between chunks; a partially written destination is left as is.

use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;

use seedfile_config::defaults::DEFAULT_BUFFER_SIZE;
use seedfile_host::{ResolveContext, ResolvedData, TableId, ValuesMutable};
use tracing::{info, warn};

use crate::context::from_context;
use crate::endpoint::{FileReader, FileWriter};
use crate::error::{CopyError, CopyResult};
use crate::value::CopyValue;

/// Everything a resolve callback receives once both endpoints are ready.
pub struct ResolveRequest<'a> {
    /// Context of the current pipeline run.
    pub ctx: &'a ResolveContext,
    /// Rows resolved so far.
    pub resolved_data: &'a ResolvedData,
    /// Table owning the row.
    pub table_id: &'a TableId,
    /// Field holding the copy declaration.
    pub field_name: &'a str,
    /// Values of the row; callbacks may set sibling fields.
    pub values: &'a mut dyn ValuesMutable,
    /// Declaration being resolved.
    pub value: &'a CopyValue,
    /// Resolved source endpoint.
    pub reader: &'a dyn FileReader,
    /// Resolved destination endpoint.
    pub writer: &'a dyn FileWriter,
}

/// Callback invoked with the resolved endpoints of a copy declaration.
pub type ResolveCallback = Arc<dyn Fn(&mut ResolveRequest<'_>) -> CopyResult<()> + Send + Sync>;

/// Copy every byte of `reader` into `writer` using the default chunk size.
///
/// # Errors
///
/// See [`copy_file_with_buffer`].
pub fn copy_file(
    ctx: &ResolveContext,
    reader: &dyn FileReader,
    writer: &dyn FileWriter,
) -> CopyResult<u64> {
    copy_file_with_buffer(ctx, reader, writer, DEFAULT_BUFFER_SIZE)
}

/// Copy every byte of `reader` into `writer` in chunks of `buffer_size` bytes.
///
/// The source is opened before the destination, so a missing source never
/// creates or truncates the destination. Both streams are released on return.
///
/// # Errors
///
/// - [`CopyError::ReadSource`] when the source cannot be opened.
/// - [`CopyError::WriteDestination`] when the destination cannot be created.
/// - [`CopyError::CopyData`] when streaming fails.
/// - [`CopyError::Cancelled`] when `ctx` is cancelled before the copy completes;
///   nothing is opened when it was cancelled up front.
pub fn copy_file_with_buffer(
    ctx: &ResolveContext,
    reader: &dyn FileReader,
    writer: &dyn FileWriter,
    buffer_size: usize,
) -> CopyResult<u64> {
    if ctx.is_cancelled() {
        return Err(CopyError::Cancelled { copied: 0 });
    }
    let mut input = reader
        .new_reader(ctx)
        .map_err(|source| CopyError::ReadSource {
            source: Box::new(source),
        })?;
    let mut output = writer
        .new_writer(ctx)
        .map_err(|source| CopyError::WriteDestination {
            source: Box::new(source),
        })?;

    let mut buffer = vec![0_u8; buffer_size.max(1)];
    let mut copied = 0_u64;
    loop {
        if ctx.is_cancelled() {
            return Err(CopyError::Cancelled { copied });
        }
        let read = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(CopyError::CopyData { source }),
        };
        output
            .write_all(&buffer[..read])
            .map_err(|source| CopyError::CopyData { source })?;
        copied += read as u64;
    }
    output
        .flush()
        .map_err(|source| CopyError::CopyData { source })?;
    Ok(copied)
}

/// Stock resolve callback: copy the source into the destination.
///
/// Uses the chunk size of the process in context, or the default when none was started.
///
/// # Errors
///
/// Returns the errors of [`copy_file_with_buffer`].
pub fn resolve_copy_file(request: &mut ResolveRequest<'_>) -> CopyResult<()> {
    let buffer_size =
        from_context(request.ctx).map_or(DEFAULT_BUFFER_SIZE, |process| process.buffer_size());
    match copy_file_with_buffer(request.ctx, request.reader, request.writer, buffer_size) {
        Ok(bytes) => {
            info!(
                table = %request.table_id,
                field = request.field_name,
                source = %request.reader,
                destination = %request.writer,
                bytes,
                "file copied"
            );
            Ok(())
        }
        Err(err) => {
            warn!(
                table = %request.table_id,
                field = request.field_name,
                source = %request.reader,
                destination = %request.writer,
                error = %err,
                "file copy failed"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::WriteStream;
    use crate::reader::{BytesReader, FsFileReader};
    use crate::writer::FsFileWriter;
    use seedfile_host::CancellationToken;
    use std::fmt::{self, Display, Formatter};
    use std::fs;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .map_err(|_| std::io::Error::other("sink poisoned"))?
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl FileWriter for SharedSink {
        fn new_writer(&self, _ctx: &ResolveContext) -> CopyResult<WriteStream> {
            Ok(Box::new(self.clone()))
        }
    }

    impl Display for SharedSink {
        fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
            formatter.write_str("memory sink")
        }
    }

    impl SharedSink {
        fn contents(&self) -> Vec<u8> {
            self.0.lock().map(|data| data.clone()).unwrap_or_default()
        }
    }

    #[test]
    fn copies_across_chunk_boundaries() -> CopyResult<()> {
        let payload: Vec<u8> = (0..=255_u8).cycle().take(10_000).collect();
        let reader = BytesReader::new(payload.clone());
        let sink = SharedSink::default();

        let copied = copy_file_with_buffer(&ResolveContext::new(), &reader, &sink, 1024)?;
        assert_eq!(copied, 10_000);
        assert_eq!(sink.contents(), payload);
        Ok(())
    }

    #[test]
    fn empty_source_produces_empty_destination() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("empty.out");
        let writer = FsFileWriter::new("empty.out", &path);

        let copied = copy_file(&ResolveContext::new(), &BytesReader::new(Vec::new()), &writer)?;
        assert_eq!(copied, 0);
        assert!(fs::read(&path)?.is_empty());
        Ok(())
    }

    #[test]
    fn missing_source_never_touches_destination() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let destination = dir.path().join("out.txt");
        let reader = FsFileReader::new("missing.txt", dir.path().join("missing.txt"));
        let writer = FsFileWriter::new("out.txt", &destination);

        let err = copy_file(&ResolveContext::new(), &reader, &writer).err();
        assert!(matches!(err, Some(CopyError::ReadSource { .. })));
        assert!(matches!(
            err.as_ref().map(CopyError::root_cause),
            Some(CopyError::Open { .. })
        ));
        assert!(!destination.exists());
        Ok(())
    }

    #[test]
    fn uncreatable_destination_is_reported() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let writer = FsFileWriter::new("x/out.txt", dir.path().join("x").join("out.txt"));

        let reader = BytesReader::new(b"data".to_vec());
        let err = copy_file(&ResolveContext::new(), &reader, &writer).err();
        assert!(matches!(err, Some(CopyError::WriteDestination { .. })));
        Ok(())
    }

    #[test]
    fn cancelled_context_stops_before_first_chunk() {
        let token = CancellationToken::new();
        let ctx = ResolveContext::new().with_cancellation(token.clone());
        token.cancel();
        let sink = SharedSink::default();

        let err = copy_file(&ctx, &BytesReader::new(b"data".to_vec()), &sink).err();
        assert!(matches!(err, Some(CopyError::Cancelled { copied: 0 })));
        assert!(sink.contents().is_empty());
    }
}
