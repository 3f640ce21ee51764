//! Scratch directories and file helpers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Source and destination roots inside one temporary directory.
#[derive(Debug)]
pub struct SeedDirs {
    dir: TempDir,
    source: PathBuf,
    destination: PathBuf,
}

impl SeedDirs {
    /// Create `source/` and `destination/` beneath a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the directories cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("seedfile-")
            .tempdir()
            .context("failed to create scratch directory")?;
        let source = dir.path().join("source");
        let destination = dir.path().join("destination");
        fs::create_dir(&source).context("failed to create source root")?;
        fs::create_dir(&destination).context("failed to create destination root")?;
        Ok(Self {
            dir,
            source,
            destination,
        })
    }

    /// Scratch directory holding both roots.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Root for source files.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Root for destination files.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Write `contents` to `name` beneath the source root and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn write_source(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        write_file(&self.source.join(name), contents)
    }

    /// Read `name` beneath the destination root.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read.
    pub fn read_destination(&self, name: &str) -> Result<Vec<u8>> {
        read_file(&self.destination.join(name))
    }
}

/// Write `contents` to `path`, creating missing parent directories.
///
/// # Errors
///
/// Returns an error when a directory or the file cannot be written.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Read the whole file at `path`.
///
/// # Errors
///
/// Returns an error when the file cannot be read.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
