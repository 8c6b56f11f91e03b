//! Parse HTTP response header lines into ResourceMetadata.

use super::ResourceMetadata;

/// Parse collected header lines into ResourceMetadata.
///
/// Unparsable `Content-Length` yields `None`; the caller decides whether that is fatal.
pub(crate) fn parse_headers(lines: &[String]) -> ResourceMetadata {
    let mut total_length = None;
    let mut supports_byte_ranges = false;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                total_length = value.parse::<u64>().ok();
            }
            if name.eq_ignore_ascii_case("accept-ranges") {
                supports_byte_ranges = value.to_ascii_lowercase().contains("bytes");
            }
        }
    }

    ResourceMetadata {
        total_length,
        supports_byte_ranges,
    }
}
