//! Parallel chunk fetcher.
//!
//! Runs one HTTP Range GET per chunk on a bounded pool of worker threads,
//! validates each body against the chunk length, and writes it at the chunk's
//! offset in the shared output file. The first failure wins: remaining work is
//! cancelled and the error is returned; chunks already written stay in place.

mod chunk;
mod pool;

use std::time::Duration;

use crate::error::DownloadError;
use crate::http::HttpOptions;
use crate::planner::Chunk;
use crate::storage::OutputFile;

/// Outcome of a single chunk: written, or the reason it was not.
pub type ChunkResult = Result<(), DownloadError>;

/// Knobs for `fetch_chunks`.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum number of chunk downloads in flight.
    pub concurrency: usize,
    /// How long to wait for in-flight chunks after the first failure.
    pub shutdown_grace: Duration,
    pub http: HttpOptions,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            shutdown_grace: Duration::from_secs(30),
            http: HttpOptions::default(),
        }
    }
}

/// Downloads every chunk of `url` into `output`.
///
/// `output` must already be sized to cover every chunk. On success the file
/// holds the resource bytes in offset order.
pub fn fetch_chunks(
    url: &str,
    chunks: &[Chunk],
    output: &OutputFile,
    opts: &FetchOptions,
) -> Result<(), DownloadError> {
    if opts.concurrency == 0 {
        return Err(DownloadError::InvalidArgument(
            "concurrency must be > 0".to_string(),
        ));
    }
    tracing::debug!(
        url,
        chunks = chunks.len(),
        concurrency = opts.concurrency,
        "fetching chunks"
    );
    pool::run_pool(url, chunks, output, opts)
}
