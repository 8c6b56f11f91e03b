//! Single-chunk HTTP Range GET, length validation, and positioned write.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::DownloadError;
use crate::http::HttpOptions;
use crate::planner::Chunk;
use crate::storage::OutputFile;

use super::ChunkResult;

/// Upper bound on the up-front buffer reservation; larger chunks grow as data arrives.
const INITIAL_BUFFER_CAPACITY: usize = 64 * 1024;

/// Accumulates a chunk's response body, keeping at most `expected` bytes.
///
/// Servers that ignore the range and send more than asked for are tolerated:
/// the first `expected` bytes are kept and the rest is refused.
#[derive(Debug)]
pub(super) struct ChunkBuffer {
    expected: u64,
    data: Vec<u8>,
    overflowed: bool,
}

impl ChunkBuffer {
    pub(super) fn new(expected: u64) -> Self {
        Self {
            expected,
            data: Vec::with_capacity(
                usize::try_from(expected).map_or(INITIAL_BUFFER_CAPACITY, |n| {
                    n.min(INITIAL_BUFFER_CAPACITY)
                }),
            ),
            overflowed: false,
        }
    }

    /// Appends body bytes. Returns false once the buffer is full and more data arrived.
    pub(super) fn push(&mut self, data: &[u8]) -> bool {
        let room = self.expected.saturating_sub(self.data.len() as u64);
        let take = usize::try_from(room).map_or(data.len(), |r| r.min(data.len()));
        self.data.extend_from_slice(&data[..take]);
        if take < data.len() {
            self.overflowed = true;
            return false;
        }
        true
    }

    pub(super) fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// The chunk payload, or `ChunkSizeMismatch` if the body came up short.
    pub(super) fn finish(self, chunk: Chunk) -> Result<Vec<u8>, DownloadError> {
        let received = self.data.len() as u64;
        if received < self.expected {
            return Err(DownloadError::ChunkSizeMismatch {
                chunk,
                expected: self.expected,
                received,
            });
        }
        Ok(self.data)
    }
}

/// Fetches `chunk` and writes it at its start offset in `output`.
pub(super) fn fetch_and_place(
    url: &str,
    chunk: Chunk,
    output: &OutputFile,
    http: &HttpOptions,
    cancel: &AtomicBool,
) -> ChunkResult {
    if cancel.load(Ordering::Relaxed) {
        return Err(DownloadError::Cancelled { chunk });
    }
    let payload = fetch_chunk(url, chunk, http, cancel)?;
    output
        .write_at(chunk.start, &payload)
        .map_err(|source| DownloadError::Write { chunk, source })?;
    tracing::debug!(%chunk, "chunk written");
    Ok(())
}

/// Ranged GET for `chunk`. Accepts 206 or 200; aborts early when `cancel` is set.
fn fetch_chunk(
    url: &str,
    chunk: Chunk,
    http: &HttpOptions,
    cancel: &AtomicBool,
) -> Result<Vec<u8>, DownloadError> {
    let transport = |source| DownloadError::Transport { chunk, source };
    let mut buffer = ChunkBuffer::new(chunk.len());

    let mut easy = http.easy(url).map_err(transport)?;
    easy.range(&chunk.curl_range()).map_err(transport)?;
    // Enables the progress callback, which doubles as a cancellation point while stalled.
    easy.progress(true).map_err(transport)?;

    let outcome = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if cancel.load(Ordering::Relaxed) || !buffer.push(data) {
                    return Ok(0); // abort transfer
                }
                Ok(data.len())
            })
            .map_err(transport)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.load(Ordering::Relaxed))
            .map_err(transport)?;
        transfer.perform()
    };

    if let Err(e) = outcome {
        if !buffer.overflowed() {
            if cancel.load(Ordering::Relaxed) {
                return Err(DownloadError::Cancelled { chunk });
            }
            return Err(transport(e));
        }
        tracing::debug!(%chunk, "server sent more than the requested range; truncated");
    }

    let status = easy.response_code().map_err(transport)?;
    if status != 200 && status != 206 {
        return Err(DownloadError::Fetch { chunk, status });
    }

    buffer.finish(chunk)
}
