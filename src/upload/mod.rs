//! Outbound path: turn one oversized file into an ordered set of named chunk
//! blobs and hand them to the host in paced batches.
//!
//! [`UploadSplitter`] decides whether a file needs chunking at all and builds
//! the [`ChunkSet`]. [`BatchPacer`] groups blobs into batches and spaces the
//! batches out in time. [`partition_uploads`] handles a multi-file request in
//! one pass.

pub mod error;
pub mod pacing;
pub mod partition;
pub mod splitter;

pub use error::UploadError;
pub use pacing::BatchPacer;
pub(crate) use pacing::pacing_limiter;
pub use partition::{Partition, UploadFile, partition_uploads};
pub use splitter::{ChunkSet, NamedBlob, UploadPlan, UploadSplitter};
