//! Single-pass handling of multi-file upload requests.

use bytes::Bytes;

use super::{ChunkSet, UploadError, UploadPlan, UploadSplitter};

/// A file queued for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    /// Name the file is uploaded under.
    pub name: String,
    /// File contents.
    pub data: Bytes,
}

impl UploadFile {
    /// Queue `data` under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Files that fit as-is alongside the chunk sets cut from the rest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    /// Files the host accepts without chunking, in request order.
    pub unmodified: Vec<UploadFile>,
    /// Chunk sets for oversized files, in request order.
    pub chunked: Vec<ChunkSet>,
}

impl Partition {
    /// Batching is turned off when several files are chunked at once.
    #[must_use]
    pub fn disables_batching(&self) -> bool { self.chunked.len() > 1 }

    /// Total number of chunk blobs across all oversized files.
    #[must_use]
    pub fn chunk_count(&self) -> usize { self.chunked.iter().map(ChunkSet::len).sum() }
}

/// Split a batch of files into those that fit and chunk sets for the rest.
///
/// # Errors
///
/// Returns [`UploadError::TooManyChunks`] if any oversized file needs more
/// than 256 chunks. The whole request is refused in that case.
pub fn partition_uploads(
    files: Vec<UploadFile>,
    splitter: &UploadSplitter,
) -> Result<Partition, UploadError> {
    let mut partition = Partition::default();
    for file in files {
        match splitter.plan(&file.name, &file.data)? {
            UploadPlan::Unmodified => partition.unmodified.push(file),
            UploadPlan::Chunked(set) => partition.chunked.push(set),
        }
    }
    Ok(partition)
}
