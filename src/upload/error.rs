//! Errors raised while preparing or sending an upload.

use thiserror::Error;

use crate::{chunk::EncodingError, host::HostError};

/// Errors that fail a single upload attempt.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file would need more chunks than a header can number.
    #[error("file requires {required} chunks; at most 256 are supported")]
    TooManyChunks {
        /// Chunks the file would have needed.
        required: usize,
    },
    /// The host reported no usable upload size limit.
    #[error("maximum upload size unavailable")]
    UploadSizeUnavailable,
    /// A chunk header could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// The host rejected a batch.
    #[error("upload of batch {batch} failed: {source}")]
    Transport {
        /// Zero-based position of the failing batch.
        batch: usize,
        /// Error reported by the host.
        #[source]
        source: HostError,
    },
    /// Reading the local file failed.
    #[error("failed to read upload source: {0}")]
    Io(#[from] std::io::Error),
}
