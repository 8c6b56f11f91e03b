//! End-to-end parallel download: probe, plan, pre-size, fetch.

use std::path::Path;
use std::time::Duration;

use crate::config::RangedlConfig;
use crate::error::DownloadError;
use crate::fetcher::{fetch_chunks, FetchOptions};
use crate::http::HttpOptions;
use crate::planner::plan_chunks;
use crate::probe::probe;
use crate::storage::OutputFileBuilder;

/// Runtime options for a `ParallelDownloader`.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Worker count (concurrent ranged GETs).
    pub threads: usize,
    /// Chunk size in bytes.
    pub chunk_size: u64,
    /// Grace period for in-flight chunks after the first failure.
    pub shutdown_grace: Duration,
    pub http: HttpOptions,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self::from_config(&RangedlConfig::default())
    }
}

impl DownloadOptions {
    pub fn from_config(cfg: &RangedlConfig) -> Self {
        let http = &cfg.http;
        Self {
            threads: cfg.threads,
            chunk_size: cfg.chunk_size,
            shutdown_grace: Duration::from_secs(cfg.shutdown_grace_secs),
            http: HttpOptions {
                connect_timeout: Duration::from_secs(http.connect_timeout_secs),
                probe_timeout: Duration::from_secs(http.probe_timeout_secs),
                low_speed_limit: http.low_speed_limit,
                low_speed_time: Duration::from_secs(http.low_speed_time_secs),
                max_redirections: http.max_redirections,
                user_agent: http.user_agent.clone(),
            },
        }
    }
}

/// Summary of a completed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub total_length: u64,
    pub chunk_count: usize,
}

/// Downloads a resource with concurrent HTTP Range GETs into a pre-sized file.
#[derive(Debug, Clone)]
pub struct ParallelDownloader {
    opts: DownloadOptions,
}

impl ParallelDownloader {
    /// Fails with `InvalidArgument` if `threads` or `chunk_size` is 0.
    pub fn new(opts: DownloadOptions) -> Result<Self, DownloadError> {
        if opts.threads == 0 {
            return Err(DownloadError::InvalidArgument(
                "threads must be > 0".to_string(),
            ));
        }
        if opts.chunk_size == 0 {
            return Err(DownloadError::InvalidArgument(
                "chunk size must be > 0".to_string(),
            ));
        }
        Ok(Self { opts })
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.opts
    }

    /// Downloads `url` to `output`.
    ///
    /// The server must advertise `Accept-Ranges: bytes` and a valid
    /// `Content-Length`; otherwise this fails before any ranged GET and before
    /// touching `output`. On a chunk failure the partially written file is left
    /// in place.
    pub fn download(&self, url: &str, output: &Path) -> Result<DownloadReport, DownloadError> {
        let metadata = probe(url, &self.opts.http)?;
        if !metadata.supports_byte_ranges {
            return Err(DownloadError::UnsupportedServer {
                url: url.to_string(),
            });
        }
        let total_length = metadata
            .total_length
            .ok_or_else(|| DownloadError::UnknownLength {
                url: url.to_string(),
            })?;

        let chunks = plan_chunks(total_length, self.opts.chunk_size)?;
        tracing::info!(
            url,
            total_length,
            chunks = chunks.len(),
            threads = self.opts.threads,
            chunk_size = self.opts.chunk_size,
            output = %output.display(),
            "starting download"
        );

        let storage_err = |source| DownloadError::Storage {
            path: output.to_path_buf(),
            source,
        };
        let mut builder = OutputFileBuilder::create(output).map_err(storage_err)?;
        builder.preallocate(total_length).map_err(storage_err)?;
        let file = builder.build();

        let fetch_opts = FetchOptions {
            concurrency: self.opts.threads,
            shutdown_grace: self.opts.shutdown_grace,
            http: self.opts.http.clone(),
        };
        fetch_chunks(url, &chunks, &file, &fetch_opts)?;
        file.sync().map_err(storage_err)?;

        tracing::info!(url, total_length, output = %output.display(), "download complete");
        Ok(DownloadReport {
            total_length,
            chunk_count: chunks.len(),
        })
    }
}
