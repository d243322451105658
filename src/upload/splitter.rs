//! Split a file into named chunk blobs.

use std::num::NonZeroUsize;

use bytes::Bytes;

use super::UploadError;
use crate::chunk::{
    ChunkHeader,
    ChunkIndex,
    ChunkName,
    EncodingError,
    HEADER_LEN,
    MAX_CHUNKS,
    chunk_count_for,
    encode_chunk,
    split_payload,
};

/// A blob paired with the attachment name it is uploaded under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedBlob {
    name: String,
    bytes: Bytes,
}

impl NamedBlob {
    /// Pair `bytes` with `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Attachment name.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Blob contents, header included.
    #[must_use]
    pub fn bytes(&self) -> &Bytes { &self.bytes }

    /// Blob size in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Whether the blob carries no bytes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }
}

/// Ordered chunk blobs cut from one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkSet {
    original_name: String,
    blobs: Vec<NamedBlob>,
}

impl ChunkSet {
    /// Name of the file the set was cut from.
    #[must_use]
    pub fn original_name(&self) -> &str { &self.original_name }

    /// Blobs in index order.
    #[must_use]
    pub fn blobs(&self) -> &[NamedBlob] { &self.blobs }

    /// Number of chunks in the set.
    #[must_use]
    pub fn len(&self) -> usize { self.blobs.len() }

    /// A set always holds at least one chunk; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.blobs.is_empty() }

    /// Consume the set, returning its blobs in index order.
    #[must_use]
    pub fn into_blobs(self) -> Vec<NamedBlob> { self.blobs }
}

/// What to do with a file the user asked to upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadPlan {
    /// The file fits in one upload; send it as-is.
    Unmodified,
    /// The file was split; send these blobs instead.
    Chunked(ChunkSet),
}

/// Cuts files into chunks no larger than the host's upload limit.
///
/// # Examples
///
/// ```
/// use chunkpost::upload::{UploadPlan, UploadSplitter};
///
/// let splitter = UploadSplitter::new(8).expect("usable limit");
/// assert_eq!(
///     splitter.plan("small.txt", b"tiny").expect("plan"),
///     UploadPlan::Unmodified
/// );
///
/// let set = splitter.split("big.txt", b"0123456789").expect("split");
/// let names: Vec<_> = set.blobs().iter().map(|b| b.name().to_owned()).collect();
/// assert_eq!(names, ["0-2_big.txt.dlfc", "1-2_big.txt.dlfc", "2-2_big.txt.dlfc"]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadSplitter {
    max_wire_size: usize,
    payload_cap: NonZeroUsize,
}

impl UploadSplitter {
    /// Create a splitter for blobs of at most `max_wire_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::UploadSizeUnavailable`] when the limit leaves no
    /// room for payload after the header.
    pub fn new(max_wire_size: usize) -> Result<Self, UploadError> {
        let payload_cap = max_wire_size
            .checked_sub(HEADER_LEN)
            .and_then(NonZeroUsize::new)
            .ok_or(UploadError::UploadSizeUnavailable)?;
        Ok(Self {
            max_wire_size,
            payload_cap,
        })
    }

    /// Create a splitter from the limit reported by
    /// [`Uploader::max_single_upload_size`](crate::host::Uploader::max_single_upload_size).
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::UploadSizeUnavailable`] when the host reported
    /// nothing or a limit too small to carry a header.
    pub fn for_host_limit(limit: Option<u64>) -> Result<Self, UploadError> {
        let limit = limit
            .and_then(|value| usize::try_from(value).ok())
            .ok_or(UploadError::UploadSizeUnavailable)?;
        Self::new(limit)
    }

    /// Largest blob the splitter emits.
    #[must_use]
    pub const fn max_wire_size(&self) -> usize { self.max_wire_size }

    /// Largest payload carried by one chunk.
    #[must_use]
    pub const fn payload_cap(&self) -> NonZeroUsize { self.payload_cap }

    /// Whether a file of `size` bytes must be chunked.
    #[must_use]
    pub const fn needs_split(&self, size: usize) -> bool { size > self.max_wire_size }

    /// Chunks needed to carry `size` bytes.
    #[must_use]
    pub fn required_chunks(&self, size: usize) -> usize { chunk_count_for(size, self.payload_cap) }

    /// Decide how to upload `data`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::TooManyChunks`] when the file needs more than
    /// 256 chunks.
    pub fn plan(&self, file_name: &str, data: &[u8]) -> Result<UploadPlan, UploadError> {
        if !self.needs_split(data.len()) {
            return Ok(UploadPlan::Unmodified);
        }
        self.split(file_name, data).map(UploadPlan::Chunked)
    }

    /// Split `data` into chunks unconditionally.
    ///
    /// A zero-length input becomes a single header-only chunk.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::TooManyChunks`] when the file needs more than
    /// 256 chunks. No blobs are produced in that case.
    pub fn split(&self, file_name: &str, data: &[u8]) -> Result<ChunkSet, UploadError> {
        let required = self.required_chunks(data.len());
        if required > MAX_CHUNKS {
            return Err(UploadError::TooManyChunks { required });
        }
        let count = to_index(required - 1, required - 1)?;
        let blobs = split_payload(data, self.payload_cap)
            .into_iter()
            .enumerate()
            .map(|(position, payload)| {
                let index = to_index(position, count.as_usize())?;
                let name = ChunkName::new(index, count, file_name);
                Ok(NamedBlob::new(
                    name.to_string(),
                    encode_chunk(ChunkHeader::new(index, count), payload),
                ))
            })
            .collect::<Result<Vec<_>, UploadError>>()?;
        log::debug!(
            "split {file_name} ({} bytes) into {} chunks of at most {} bytes",
            data.len(),
            blobs.len(),
            self.max_wire_size
        );
        Ok(ChunkSet {
            original_name: file_name.to_owned(),
            blobs,
        })
    }
}

fn to_index(value: usize, count: usize) -> Result<ChunkIndex, EncodingError> {
    ChunkIndex::try_from(value).map_err(|_| EncodingError::InvalidChunkIndex {
        index: i64::try_from(value).unwrap_or(i64::MAX),
        count: i64::try_from(count).unwrap_or(i64::MAX),
    })
}
