//! Zero-based chunk positioning within a chunk set.
//!
//! Provides [`ChunkIndex`], a type-safe wrapper around the single header byte
//! used for both the position of a chunk and the index of the last chunk.

use std::num::TryFromIntError;

use derive_more::{Display, From};

/// Zero-based ordinal describing a chunk's position within its set.
///
/// # Examples
///
/// ```
/// use chunkpost::chunk::ChunkIndex;
/// let index = ChunkIndex::new(3);
/// assert_eq!(index.get(), 3);
/// assert_eq!(index.as_usize(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("{_0}")]
pub struct ChunkIndex(u8);

impl ChunkIndex {
    /// Largest index representable in a header.
    pub const MAX: Self = Self(u8::MAX);

    /// Construct an index from a raw header byte.
    #[must_use]
    pub const fn new(value: u8) -> Self { Self(value) }

    /// Return the first valid chunk index.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying header byte.
    #[must_use]
    pub const fn get(self) -> u8 { self.0 }

    /// Return the index widened to `usize`.
    #[must_use]
    pub const fn as_usize(self) -> usize { self.0 as usize }
}

impl TryFrom<usize> for ChunkIndex {
    type Error = TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> { u8::try_from(value).map(Self) }
}

impl From<ChunkIndex> for u8 {
    fn from(value: ChunkIndex) -> Self { value.0 }
}
