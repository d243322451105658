//! Canonical error and result types for the crate.
//!
//! Each module reports failures through its own enum. [`Error`] gathers them
//! for callers that want a single type.

use thiserror::Error;

use crate::{
    chunk::{EncodingError, HeaderError},
    config::ConfigError,
    deletion::DeletionError,
    reassembly::{DownloadError, ReassemblyError},
    upload::UploadError,
};

/// Top-level error type exposed by `chunkpost`.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A chunk header could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// A buffer did not start with a chunk header.
    #[error(transparent)]
    Header(#[from] HeaderError),
    /// An upload could not be prepared or sent.
    #[error(transparent)]
    Upload(#[from] UploadError),
    /// Chunk headers did not form a valid set.
    #[error(transparent)]
    Reassembly(#[from] ReassemblyError),
    /// A download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),
    /// A deletion run was refused.
    #[error(transparent)]
    Deletion(#[from] DeletionError),
    /// Settings failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Local file system failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
