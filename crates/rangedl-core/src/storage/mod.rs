//! Output file lifecycle.
//!
//! Creates and pre-sizes the output file (fallocate on Unix when available,
//! else set_len) and supports concurrent positioned writes (pwrite).

mod builder;
mod writer;

pub use builder::OutputFileBuilder;
pub use writer::OutputFile;
