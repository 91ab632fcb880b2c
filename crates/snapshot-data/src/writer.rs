//! Line-delimited JSON output of normalized records.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use snapshot_core::error::{Result, SnapshotError};
use snapshot_core::models::NormalizedRecord;

/// Writes one record per line to `inner`. Every failure is reported as a
/// [`SnapshotError::FileWrite`] on `path`.
pub struct SnapshotWriter<W: Write> {
    path: PathBuf,
    inner: W,
}

impl SnapshotWriter<BufWriter<File>> {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| SnapshotError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.to_path_buf(), BufWriter::new(file)))
    }
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(path: PathBuf, inner: W) -> Self {
        Self { path, inner }
    }

    pub fn write_record(&mut self, record: &NormalizedRecord) -> Result<()> {
        serde_json::to_writer(&mut self.inner, record)
            .map_err(|e| self.write_err(io::Error::from(e)))?;
        self.inner
            .write_all(b"\n")
            .map_err(|source| self.write_err(source))
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        match self.inner.flush() {
            Ok(()) => Ok(self.inner),
            Err(source) => Err(self.write_err(source)),
        }
    }

    fn write_err(&self, source: io::Error) -> SnapshotError {
        SnapshotError::FileWrite {
            path: self.path.clone(),
            source,
        }
    }
}
