//! CLI for the rangedl parallel downloader.

use anyhow::{Context, Result};
use clap::Parser;
use rangedl_core::config;
use rangedl_core::{DownloadOptions, ParallelDownloader};
use std::path::PathBuf;

const USAGE: &str = "Usage: rangedl <url> <output> [threads] [chunk_size]\n\
Example: rangedl https://example.com/file.bin out.bin 4 1048576";

/// Top-level CLI: `rangedl <url> <output> [threads] [chunk_size]`.
#[derive(Debug, Parser)]
#[command(name = "rangedl")]
#[command(about = "Download a file with parallel HTTP Range requests", long_about = None)]
pub struct Cli {
    /// Direct HTTP/HTTPS URL to download.
    pub url: Option<String>,

    /// Output file path (created or truncated).
    pub output: Option<PathBuf>,

    /// Number of concurrent chunk downloads [config default: 4].
    pub threads: Option<usize>,

    /// Chunk size in bytes [config default: 1048576].
    pub chunk_size: Option<u64>,

    /// Read settings from this TOML file instead of ~/.config/rangedl/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn run_from_args() -> Result<()> {
    Cli::parse().run()
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let (url, output) = match (self.url, self.output) {
            (Some(url), Some(output)) => (url, output),
            _ => {
                println!("{}", USAGE);
                return Ok(());
            }
        };

        let cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        let mut opts = DownloadOptions::from_config(&cfg);
        if let Some(threads) = self.threads {
            opts.threads = threads;
        }
        if let Some(chunk_size) = self.chunk_size {
            opts.chunk_size = chunk_size;
        }

        let downloader = ParallelDownloader::new(opts)?;
        let report = downloader
            .download(&url, &output)
            .with_context(|| format!("download of {} failed", url))?;
        tracing::info!(
            "downloaded {} bytes in {} chunks to {}",
            report.total_length,
            report.chunk_count,
            output.display()
        );

        let shown = std::fs::canonicalize(&output).unwrap_or(output);
        println!("Downloaded to: {}", shown.display());
        Ok(())
    }
}
