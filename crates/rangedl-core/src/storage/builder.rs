//! Builder for creating and pre-sizing the output file.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use super::writer::OutputFile;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Builder for a new output file. Call `preallocate` then `build` to get
/// an `OutputFile` that supports concurrent `write_at` from multiple workers.
pub struct OutputFileBuilder {
    file: File,
    path: PathBuf,
}

impl OutputFileBuilder {
    /// Create the output file at `path`, truncating it if it already exists.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(OutputFileBuilder {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Pre-size the file to `size` bytes so chunk writes never extend it.
    /// On Linux tries `posix_fallocate` for real block allocation; falls back to
    /// `set_len` on failure or elsewhere.
    pub fn preallocate(&mut self, size: u64) -> io::Result<()> {
        #[cfg(target_os = "linux")]
        {
            // posix_fallocate rejects len == 0 with EINVAL.
            if size > 0 {
                let fd = self.file.as_raw_fd();
                let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
                if r == 0 {
                    return Ok(());
                }
                tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
            }
        }
        self.file.set_len(size)
    }

    /// Finish building and return a handle that can be shared for concurrent writes.
    pub fn build(self) -> OutputFile {
        OutputFile::new(self.file, self.path)
    }
}
