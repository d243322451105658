//! The fixed four byte header that prefixes every chunk blob.
//!
//! Layout: `[0xDF][0x00][index][count]`, where `count` is the index of the
//! last chunk in the set rather than the number of chunks.

use super::{ChunkIndex, EncodingError, HeaderError};

/// Marker byte opening every chunk blob.
pub const CHUNK_MAGIC: u8 = 0xDF;
/// Wire format revision carried in the second header byte.
pub const CHUNK_VERSION: u8 = 0x00;
/// Encoded header size in bytes.
pub const HEADER_LEN: usize = 4;

/// Header describing a single chunk.
///
/// # Examples
///
/// ```
/// use chunkpost::chunk::{ChunkHeader, ChunkIndex};
/// let header = ChunkHeader::new(ChunkIndex::new(1), ChunkIndex::new(2));
/// assert_eq!(header.to_bytes(), [0xDF, 0x00, 1, 2]);
/// assert_eq!(header.total_chunks(), 3);
/// assert!(!header.is_last());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkHeader {
    index: ChunkIndex,
    count: ChunkIndex,
}

impl ChunkHeader {
    /// Create a header for chunk `index` of a set whose last index is `count`.
    #[must_use]
    pub const fn new(index: ChunkIndex, count: ChunkIndex) -> Self { Self { index, count } }

    /// Return the position of this chunk.
    #[must_use]
    pub const fn index(&self) -> ChunkIndex { self.index }

    /// Return the index of the last chunk in the set.
    #[must_use]
    pub const fn count(&self) -> ChunkIndex { self.count }

    /// Number of chunks the set declares.
    #[must_use]
    pub const fn total_chunks(&self) -> usize { self.count.as_usize() + 1 }

    /// Report whether this chunk closes its set.
    #[must_use]
    pub const fn is_last(&self) -> bool { self.index.get() == self.count.get() }

    /// Report whether the index lies within the declared set.
    #[must_use]
    pub const fn is_consistent(&self) -> bool { self.index.get() <= self.count.get() }

    /// Encode the header into its wire representation.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; HEADER_LEN] {
        [CHUNK_MAGIC, CHUNK_VERSION, self.index.get(), self.count.get()]
    }
}

/// Encode a header from untyped integers.
///
/// # Errors
///
/// Returns [`EncodingError::InvalidChunkIndex`] when either value falls
/// outside `0..=255`.
///
/// # Examples
///
/// ```
/// use chunkpost::chunk::{EncodingError, encode_header};
/// assert_eq!(encode_header(0, 2), Ok([0xDF, 0x00, 0, 2]));
/// assert_eq!(
///     encode_header(-1, 2),
///     Err(EncodingError::InvalidChunkIndex { index: -1, count: 2 })
/// );
/// ```
pub fn encode_header(index: i64, count: i64) -> Result<[u8; HEADER_LEN], EncodingError> {
    let invalid = || EncodingError::InvalidChunkIndex { index, count };
    let index_byte = u8::try_from(index).map_err(|_| invalid())?;
    let count_byte = u8::try_from(count).map_err(|_| invalid())?;
    Ok(ChunkHeader::new(ChunkIndex::new(index_byte), ChunkIndex::new(count_byte)).to_bytes())
}

/// Decode the header at the start of `bytes`.
///
/// # Errors
///
/// Returns [`HeaderError::Truncated`] when fewer than [`HEADER_LEN`] bytes are
/// present and [`HeaderError::BadMagic`] when the magic or version byte is
/// wrong.
pub fn decode_header(bytes: &[u8]) -> Result<ChunkHeader, HeaderError> {
    let Some(&[magic, version, index, count]) = bytes.first_chunk::<HEADER_LEN>() else {
        return Err(HeaderError::Truncated { len: bytes.len() });
    };
    if magic != CHUNK_MAGIC || version != CHUNK_VERSION {
        return Err(HeaderError::BadMagic {
            found: [magic, version],
        });
    }
    Ok(ChunkHeader::new(ChunkIndex::new(index), ChunkIndex::new(count)))
}
