//! Error taxonomy for probing, planning, fetching and placing chunks.
//!
//! Nothing here is retried: the first error surfaces to the caller, with
//! chunk offsets attached whenever a single chunk is at fault.

use std::path::PathBuf;

use thiserror::Error;

use crate::planner::Chunk;

/// Why a metadata (HEAD) request was unusable.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    /// Curl reported an error (DNS, connect, TLS, timeout, ...).
    #[error(transparent)]
    Transport(#[from] curl::Error),
    /// Final response had a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),
}

/// Every way a parallel download can fail.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("probe of {url} failed: {source}")]
    Probe {
        url: String,
        #[source]
        source: ProbeFailure,
    },

    #[error("server for {url} does not advertise byte ranges (Accept-Ranges: bytes)")]
    UnsupportedServer { url: String },

    #[error("server for {url} sent a missing or invalid Content-Length")]
    UnknownLength { url: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Ranged GET answered with something other than 200 or 206.
    #[error("chunk {chunk}: unexpected HTTP {status} for range GET")]
    Fetch { chunk: Chunk, status: u32 },

    /// Transport failure while fetching a chunk.
    #[error("chunk {chunk}: range GET failed: {source}")]
    Transport {
        chunk: Chunk,
        #[source]
        source: curl::Error,
    },

    #[error("chunk {chunk}: size mismatch, expected {expected} bytes, got {received}")]
    ChunkSizeMismatch {
        chunk: Chunk,
        expected: u64,
        received: u64,
    },

    /// Local write of a fetched chunk failed (disk full, permissions, ...).
    #[error("chunk {chunk}: write to output file failed: {source}")]
    Write {
        chunk: Chunk,
        #[source]
        source: std::io::Error,
    },

    /// Creating or pre-sizing the output file failed.
    #[error("output file {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The chunk was stopped because a sibling chunk failed first.
    #[error("chunk {chunk}: cancelled")]
    Cancelled { chunk: Chunk },

    #[error("worker result channel closed (worker may have panicked)")]
    WorkerPanicked,
}

impl DownloadError {
    /// The chunk this error is scoped to, if any.
    pub fn chunk(&self) -> Option<Chunk> {
        match self {
            DownloadError::Fetch { chunk, .. }
            | DownloadError::Transport { chunk, .. }
            | DownloadError::ChunkSizeMismatch { chunk, .. }
            | DownloadError::Write { chunk, .. }
            | DownloadError::Cancelled { chunk } => Some(*chunk),
            _ => None,
        }
    }
}
