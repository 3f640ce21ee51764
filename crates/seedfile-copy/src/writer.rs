//! Writable endpoints.

use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::path::{Path, PathBuf};

use seedfile_host::ResolveContext;

use crate::endpoint::{FileWriter, WriteStream};
use crate::error::{CopyError, CopyResult};

/// Writes a file on the local filesystem, truncating any existing content.
///
/// Parent directories are not created; they must exist when the stream opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsFileWriter {
    filename: String,
    path: PathBuf,
}

impl FsFileWriter {
    /// Writer for `path`, remembering `filename` as the caller wrote it.
    #[must_use]
    pub fn new(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
        }
    }

    /// Path actually created.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileWriter for FsFileWriter {
    fn new_writer(&self, _ctx: &ResolveContext) -> CopyResult<WriteStream> {
        let file = File::create(&self.path).map_err(|source| CopyError::Create {
            path: self.path.clone(),
            source,
        })?;
        Ok(Box::new(file))
    }

    fn filename(&self) -> Option<&str> {
        Some(&self.filename)
    }
}

impl Display for FsFileWriter {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "file '{}' ({})", self.filename, self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn writer_truncates_existing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");
        fs::write(&path, b"previous content")?;

        let writer = FsFileWriter::new("out.txt", &path);
        {
            let mut stream = writer.new_writer(&ResolveContext::new())?;
            stream.write_all(b"new")?;
        }

        assert_eq!(fs::read(&path)?, b"new");
        assert_eq!(writer.filename(), Some("out.txt"));
        Ok(())
    }

    #[test]
    fn writer_does_not_create_parent_directories() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("out.txt");
        let writer = FsFileWriter::new("nested/out.txt", &path);

        let result = writer.new_writer(&ResolveContext::new());
        assert!(matches!(result, Err(CopyError::Create { .. })));
        assert!(!dir.path().join("nested").exists());
        Ok(())
    }
}
