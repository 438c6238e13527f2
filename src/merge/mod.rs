//! PDF concatenation
//!
//! `DocumentMerger` joins already-rendered page PDFs into one document,
//! preserving input order and the page order inside each input.

mod lopdf_merger;

pub use lopdf_merger::{page_count, LopdfMerger};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no documents to merge")]
    EmptyInput,

    #[error("input documents contain no pages")]
    NoPages,

    #[error("failed to load document {index}: {message}")]
    Load { index: usize, message: String },

    #[error("failed to write merged document: {0}")]
    Save(String),
}

/// Concatenates PDF byte streams, pages of input 0 first
///
/// Merging is CPU-bound and synchronous; async callers should run it on a
/// blocking thread.
pub trait DocumentMerger: Send + Sync {
    fn merge(&self, inputs: &[Vec<u8>]) -> Result<Vec<u8>, MergeError>;
}
