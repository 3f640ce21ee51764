//! Readable endpoints: filesystem files, in-memory bytes, and a caching wrapper.

use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use seedfile_host::ResolveContext;
use tracing::debug;

use crate::endpoint::{FileInfo, FileReader, ReadStream};
use crate::error::{CopyError, CopyResult};

/// Reads a file from the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsFileReader {
    filename: String,
    path: PathBuf,
}

impl FsFileReader {
    /// Reader for `path`, remembering `filename` as the caller wrote it.
    #[must_use]
    pub fn new(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
        }
    }

    /// Path actually opened.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> CopyResult<File> {
        File::open(&self.path).map_err(|source| CopyError::Open {
            path: self.path.clone(),
            source,
        })
    }
}

impl FileReader for FsFileReader {
    fn new_reader(&self, _ctx: &ResolveContext) -> CopyResult<ReadStream> {
        Ok(Box::new(self.open()?))
    }

    fn file_info(&self, _ctx: &ResolveContext) -> CopyResult<Option<FileInfo>> {
        let file = self.open()?;
        let metadata = file.metadata().map_err(|source| CopyError::Stat {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(FileInfo::from_metadata(&metadata)))
    }

    fn filename(&self) -> Option<&str> {
        Some(&self.filename)
    }
}

impl Display for FsFileReader {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "file '{}' ({})", self.filename, self.path.display())
    }
}

/// Reads from a byte buffer held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesReader {
    data: Arc<[u8]>,
}

impl BytesReader {
    /// Reader replaying `data`.
    #[must_use]
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }
}

impl FileReader for BytesReader {
    fn new_reader(&self, _ctx: &ResolveContext) -> CopyResult<ReadStream> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.data))))
    }

    fn file_info(&self, _ctx: &ResolveContext) -> CopyResult<Option<FileInfo>> {
        Ok(None)
    }
}

impl Display for BytesReader {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "bytes ({} bytes)", self.data.len())
    }
}

type Cached<T> = OnceCell<Result<T, Arc<CopyError>>>;

/// Wraps a reader so its data and metadata are read once and replayed.
///
/// The first `new_reader` drains the wrapped stream into memory; concurrent
/// first calls block until that single drain finishes. Failures are cached
/// and replayed just like successes.
pub struct CachedReader {
    inner: Box<dyn FileReader>,
    data: Cached<Arc<[u8]>>,
    info: Cached<Option<FileInfo>>,
}

impl CachedReader {
    /// Cache `inner`.
    #[must_use]
    pub fn new(inner: Box<dyn FileReader>) -> Self {
        Self {
            inner,
            data: OnceCell::new(),
            info: OnceCell::new(),
        }
    }

    fn materialize(&self, ctx: &ResolveContext) -> CopyResult<Arc<[u8]>> {
        let mut stream = self.inner.new_reader(ctx)?;
        let mut buffer = Vec::new();
        stream
            .read_to_end(&mut buffer)
            .map_err(|source| CopyError::CopyData { source })?;
        debug!(reader = %self.inner, bytes = buffer.len(), "cached reader materialized");
        Ok(Arc::from(buffer))
    }
}

impl FileReader for CachedReader {
    fn new_reader(&self, ctx: &ResolveContext) -> CopyResult<ReadStream> {
        match self
            .data
            .get_or_init(|| self.materialize(ctx).map_err(Arc::new))
        {
            Ok(data) => Ok(Box::new(Cursor::new(Arc::clone(data)))),
            Err(err) => Err(CopyError::Cached {
                source: Arc::clone(err),
            }),
        }
    }

    fn file_info(&self, ctx: &ResolveContext) -> CopyResult<Option<FileInfo>> {
        match self
            .info
            .get_or_init(|| self.inner.file_info(ctx).map_err(Arc::new))
        {
            Ok(info) => Ok(info.clone()),
            Err(err) => Err(CopyError::Cached {
                source: Arc::clone(err),
            }),
        }
    }

    fn filename(&self) -> Option<&str> {
        self.inner.filename()
    }
}

impl Display for CachedReader {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "cached {}", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct CountingReader {
        data: Vec<u8>,
        opens: Arc<AtomicUsize>,
        infos: Arc<AtomicUsize>,
    }

    impl FileReader for CountingReader {
        fn new_reader(&self, _ctx: &ResolveContext) -> CopyResult<ReadStream> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Cursor::new(self.data.clone())))
        }

        fn file_info(&self, _ctx: &ResolveContext) -> CopyResult<Option<FileInfo>> {
            self.infos.fetch_add(1, Ordering::SeqCst);
            Err(CopyError::Stat {
                path: PathBuf::from("counting"),
                source: std::io::Error::other("no metadata"),
            })
        }

        fn filename(&self) -> Option<&str> {
            Some("counting.bin")
        }
    }

    impl Display for CountingReader {
        fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
            formatter.write_str("counting")
        }
    }

    fn read_all(reader: &dyn FileReader, ctx: &ResolveContext) -> anyhow::Result<Vec<u8>> {
        let mut out = Vec::new();
        reader.new_reader(ctx)?.read_to_end(&mut out)?;
        Ok(out)
    }

    #[test]
    fn fs_reader_reads_and_stats_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("a.txt");
        fs::write(&path, b"hello")?;
        let reader = FsFileReader::new("a.txt", &path);
        let ctx = ResolveContext::new();

        assert_eq!(read_all(&reader, &ctx)?, b"hello");
        assert_eq!(reader.file_info(&ctx)?.map(|info| info.len), Some(5));
        assert_eq!(reader.filename(), Some("a.txt"));
        assert_eq!(reader.path(), path.as_path());
        Ok(())
    }

    #[test]
    fn fs_reader_wraps_open_failures_with_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("missing.txt");
        let reader = FsFileReader::new("missing.txt", &path);
        let ctx = ResolveContext::new();

        match reader.new_reader(&ctx) {
            Err(CopyError::Open { path: failed, .. }) => assert_eq!(failed, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected open failure"),
        }
        assert!(matches!(reader.file_info(&ctx), Err(CopyError::Open { .. })));
        Ok(())
    }

    #[test]
    fn bytes_reader_has_no_file_info() -> anyhow::Result<()> {
        let reader = BytesReader::new(b"payload".to_vec());
        let ctx = ResolveContext::new();

        assert_eq!(read_all(&reader, &ctx)?, b"payload");
        assert_eq!(read_all(&reader, &ctx)?, b"payload");
        assert!(reader.file_info(&ctx)?.is_none());
        assert!(reader.filename().is_none());
        assert_eq!(reader.to_string(), "bytes (7 bytes)");
        Ok(())
    }

    #[test]
    fn cached_reader_materializes_once_across_threads() -> anyhow::Result<()> {
        let opens = Arc::new(AtomicUsize::new(0));
        let infos = Arc::new(AtomicUsize::new(0));
        let cached = Arc::new(CachedReader::new(Box::new(CountingReader {
            data: b"cached bytes".to_vec(),
            opens: Arc::clone(&opens),
            infos: Arc::clone(&infos),
        })));
        let ctx = ResolveContext::new();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cached = Arc::clone(&cached);
                let ctx = ctx.clone();
                thread::spawn(move || {
                    read_all(cached.as_ref(), &ctx).map_err(|err| err.to_string())
                })
            })
            .collect();
        for handle in handles {
            let data = handle
                .join()
                .map_err(|_| anyhow::anyhow!("reader thread panicked"))?
                .map_err(anyhow::Error::msg)?;
            assert_eq!(data, b"cached bytes");
        }

        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert_eq!(cached.filename(), Some("counting.bin"));
        Ok(())
    }

    #[test]
    fn cached_reader_replays_info_failures() {
        let infos = Arc::new(AtomicUsize::new(0));
        let cached = CachedReader::new(Box::new(CountingReader {
            data: Vec::new(),
            opens: Arc::new(AtomicUsize::new(0)),
            infos: Arc::clone(&infos),
        }));
        let ctx = ResolveContext::new();

        for _ in 0..3 {
            let err = cached.file_info(&ctx).err();
            assert!(matches!(
                err.as_ref().map(CopyError::root_cause),
                Some(CopyError::Stat { .. })
            ));
        }
        assert_eq!(infos.load(Ordering::SeqCst), 1);
    }
}
