//! Error types emitted by the chunk codec.
//!
//! Encoding failures surface to the upload that triggered them. Header
//! failures only ever cost the offending buffer.

use thiserror::Error;

/// Errors produced while building chunk headers.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// The index or count does not fit in a single header byte.
    #[error("chunk index {index} or count {count} outside 0..=255")]
    InvalidChunkIndex {
        /// Requested chunk position.
        index: i64,
        /// Requested last-chunk index.
        count: i64,
    },
}

/// Errors produced while reading a chunk header from raw bytes.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// Fewer than four bytes were supplied.
    #[error("chunk header truncated: {len} of 4 bytes present")]
    Truncated {
        /// Number of bytes actually available.
        len: usize,
    },
    /// The magic or version byte did not match.
    #[error("bad chunk magic: expected [DF, 00], found {found:02X?}")]
    BadMagic {
        /// The first two bytes of the buffer.
        found: [u8; 2],
    },
}
