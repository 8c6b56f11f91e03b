//! Chunk type and HTTP Range math.

use std::fmt;

/// A single chunk: byte range [start, end] (both inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// First byte offset.
    pub start: u64,
    /// Last byte offset.
    pub end: u64,
}

impl Chunk {
    /// Length of this chunk in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false; a chunk covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// HTTP Range header value: `bytes=start-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}", self.curl_range())
    }

    /// Range in the form curl's `CURLOPT_RANGE` expects: `start-end`.
    pub(crate) fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes {}-{}", self.start, self.end)
    }
}
