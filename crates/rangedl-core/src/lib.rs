pub mod config;
pub mod logging;

pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod planner;
pub mod probe;
pub mod storage;

pub use downloader::{DownloadOptions, DownloadReport, ParallelDownloader};
pub use error::{DownloadError, ProbeFailure};
