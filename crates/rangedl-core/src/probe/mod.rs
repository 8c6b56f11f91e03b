//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to fetch the final response headers and read
//! `Content-Length` and `Accept-Ranges`.

mod parse;

use std::str;

use crate::error::{DownloadError, ProbeFailure};
use crate::http::HttpOptions;

/// What a HEAD request tells us about the remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceMetadata {
    /// Total size in bytes; `None` if `Content-Length` is missing or not a valid integer.
    pub total_length: Option<u64>,
    /// True if `Accept-Ranges` mentions `bytes`.
    pub supports_byte_ranges: bool,
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects; only the final response's headers are considered.
/// Runs in the current thread. Not retried.
pub fn probe(url: &str, http: &HttpOptions) -> Result<ResourceMetadata, DownloadError> {
    let fail = |source: ProbeFailure| DownloadError::Probe {
        url: url.to_string(),
        source,
    };
    let mut headers: Vec<String> = Vec::new();

    let mut easy = http.easy(url).map_err(|e| fail(e.into()))?;
    easy.nobody(true).map_err(|e| fail(e.into()))?; // HEAD request
    easy.timeout(http.probe_timeout).map_err(|e| fail(e.into()))?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line starts a new response (redirect hop).
                    if line.starts_with("HTTP/") {
                        headers.clear();
                    }
                    headers.push(line.to_string());
                }
                true
            })
            .map_err(|e| fail(e.into()))?;
        transfer.perform().map_err(|e| fail(e.into()))?;
    }

    let code = easy.response_code().map_err(|e| fail(e.into()))?;
    if !(200..300).contains(&code) {
        return Err(fail(ProbeFailure::Status(code)));
    }

    let metadata = parse::parse_headers(&headers);
    tracing::debug!(
        url,
        total_length = ?metadata.total_length,
        supports_byte_ranges = metadata.supports_byte_ranges,
        "probe complete"
    );
    Ok(metadata)
}
