//! Concurrent positioned writer for the output file.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
#[cfg(unix)]
use std::os::unix::fs::FileExt;
#[cfg(not(unix))]
use std::sync::Mutex;

/// Shared handle to the pre-sized output file. Clones share one open file;
/// each `write_at` is independent of any cursor (pwrite-style).
#[derive(Clone)]
pub struct OutputFile {
    file: Arc<File>,
    path: PathBuf,
    /// Serializes seek+write where positioned writes are unavailable.
    #[cfg(not(unix))]
    seek_lock: Arc<Mutex<()>>,
}

impl OutputFile {
    pub(crate) fn new(file: File, path: PathBuf) -> Self {
        Self {
            file: Arc::new(file),
            path,
            #[cfg(not(unix))]
            seek_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Write all of `data` at `offset`. Safe for concurrent use on disjoint ranges.
    #[cfg(unix)]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.file.write_all_at(data, offset)
    }

    #[cfg(not(unix))]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> io::Result<()> {
        use std::io::{Seek, SeekFrom, Write};
        let _guard = self
            .seek_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut f = &*self.file;
        f.seek(SeekFrom::Start(offset))?;
        f.write_all(data)
    }

    /// Sync file data to disk.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
