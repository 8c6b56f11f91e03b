//! Chunk planning.
//!
//! Partitions `[0, total_length)` into fixed-size, inclusive-bounded chunks.
//! Each chunk maps to exactly one HTTP Range GET and one positioned write.

mod chunk;

pub use chunk::Chunk;

use crate::error::DownloadError;

/// Splits `total_length` bytes into contiguous chunks of `chunk_size` bytes;
/// the last chunk holds the remainder.
///
/// Returns an empty plan for an empty resource. Fails with
/// `InvalidArgument` when `chunk_size` is 0.
pub fn plan_chunks(total_length: u64, chunk_size: u64) -> Result<Vec<Chunk>, DownloadError> {
    if chunk_size == 0 {
        return Err(DownloadError::InvalidArgument(
            "chunk size must be > 0".to_string(),
        ));
    }

    let count = total_length.div_ceil(chunk_size);
    let mut out = Vec::with_capacity(count as usize);
    let mut start = 0u64;

    while start < total_length {
        let end = start
            .saturating_add(chunk_size - 1)
            .min(total_length - 1);
        out.push(Chunk { start, end });
        start = end + 1;
    }

    Ok(out)
}
