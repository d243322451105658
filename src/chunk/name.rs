//! Attachment naming for chunk blobs.
//!
//! A chunk is uploaded as `{index}-{count}_{original}.dlfc`, which lets a
//! message scan recover the header fields and the original file name without
//! downloading anything.

use std::fmt;

use super::ChunkIndex;

/// File extension appended to every chunk blob name.
pub const CHUNK_EXTENSION: &str = "dlfc";

/// Parsed form of a chunk blob file name.
///
/// # Examples
///
/// ```
/// use chunkpost::chunk::{ChunkIndex, ChunkName};
/// let name = ChunkName::parse("1-2_report.pdf.dlfc").expect("chunk name");
/// assert_eq!(name.index(), ChunkIndex::new(1));
/// assert_eq!(name.count(), ChunkIndex::new(2));
/// assert_eq!(name.original(), "report.pdf");
/// assert_eq!(name.to_string(), "1-2_report.pdf.dlfc");
///
/// assert!(ChunkName::parse("holiday.png").is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkName {
    index: ChunkIndex,
    count: ChunkIndex,
    original: String,
}

impl ChunkName {
    /// Build the name for chunk `index` of `original`.
    #[must_use]
    pub fn new(index: ChunkIndex, count: ChunkIndex, original: impl Into<String>) -> Self {
        Self {
            index,
            count,
            original: original.into(),
        }
    }

    /// Parse an attachment name.
    ///
    /// Returns `None` for anything that is not a chunk name: a missing or
    /// non-numeric prefix, a missing count, a value above 255, an empty
    /// original name, or the wrong extension. The legacy `{index}_{name}`
    /// form without a count is not accepted.
    #[must_use]
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name
            .strip_suffix(CHUNK_EXTENSION)?
            .strip_suffix('.')?;
        let (index, rest) = stem.split_once('-')?;
        let (count, original) = rest.split_once('_')?;
        if original.is_empty() {
            return None;
        }
        Some(Self::new(parse_field(index)?, parse_field(count)?, original))
    }

    /// Position of the chunk recovered from the name.
    #[must_use]
    pub const fn index(&self) -> ChunkIndex { self.index }

    /// Index of the last chunk recovered from the name.
    #[must_use]
    pub const fn count(&self) -> ChunkIndex { self.count }

    /// Name of the file the chunk was cut from.
    #[must_use]
    pub fn original(&self) -> &str { &self.original }
}

impl fmt::Display for ChunkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}_{}.{CHUNK_EXTENSION}",
            self.index, self.count, self.original
        )
    }
}

fn parse_field(digits: &str) -> Option<ChunkIndex> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u8>().ok().map(ChunkIndex::new)
}
