//! Chunk wire format primitives.
//!
//! A chunk blob is a four byte [`ChunkHeader`] followed by a slice of the
//! original file. This module collects the byte-level codec together with the
//! naming scheme that lets discovery recover header fields from attachment
//! names alone. Nothing here performs I/O.

pub mod error;
pub mod header;
pub mod index;
pub mod name;
pub mod payload;

pub use error::{EncodingError, HeaderError};
pub use header::{
    CHUNK_MAGIC,
    CHUNK_VERSION,
    ChunkHeader,
    HEADER_LEN,
    decode_header,
    encode_header,
};
pub use index::ChunkIndex;
pub use name::{CHUNK_EXTENSION, ChunkName};
pub use payload::{MAX_CHUNKS, chunk_count_for, decode_chunk, encode_chunk, split_payload};
