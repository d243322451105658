//! Errors raised while rebuilding a file from its chunks.

use thiserror::Error;

use crate::{chunk::ChunkIndex, host::HostError};

/// The specific header disagreement behind
/// [`ReassemblyError::InconsistentHeaders`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum HeaderConflict {
    /// A chunk claims a position past its own declared last index.
    #[error("index {index} beyond last index {count}")]
    IndexBeyondCount {
        /// Offending position.
        index: ChunkIndex,
        /// Last index declared by the same chunk.
        count: ChunkIndex,
    },
    /// Two chunks declare different set sizes.
    #[error("last index {found} disagrees with {expected}")]
    CountMismatch {
        /// Last index declared by the lowest chunk.
        expected: ChunkIndex,
        /// Conflicting last index.
        found: ChunkIndex,
    },
    /// Two chunks claim the same position.
    #[error("index {index} appears more than once")]
    DuplicateIndex {
        /// Repeated position.
        index: ChunkIndex,
    },
}

/// Errors returned by [`reassemble`](super::reassemble).
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// Chunk headers contradict each other.
    #[error("inconsistent chunk headers: {0}")]
    InconsistentHeaders(HeaderConflict),
    /// Some positions in `0..=count` are absent.
    #[error("missing chunks {missing:?} of {expected}")]
    MissingChunks {
        /// Absent positions in ascending order.
        missing: Vec<ChunkIndex>,
        /// Chunks the set declares; zero when no valid chunk was supplied.
        expected: usize,
    },
}

impl From<HeaderConflict> for ReassemblyError {
    fn from(conflict: HeaderConflict) -> Self { Self::InconsistentHeaders(conflict) }
}

/// Errors that abort a download.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DownloadError {
    /// A chunk could not be fetched.
    #[error("failed to fetch {url}: {source}")]
    FetchFailure {
        /// Location that failed.
        url: String,
        /// Error reported by the host.
        #[source]
        source: HostError,
    },
    /// The fetched chunks did not form a valid set.
    #[error(transparent)]
    Reassembly(#[from] ReassemblyError),
    /// The staging directory could not be used.
    #[error("staging failed: {0}")]
    Staging(#[from] std::io::Error),
    /// The rebuilt file could not be saved.
    #[error("failed to save {filename}: {source}")]
    Save {
        /// Name the file was to be saved under.
        filename: String,
        /// Error reported by the saver.
        #[source]
        source: HostError,
    },
}
