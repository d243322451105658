#![doc(html_root_url = "https://docs.rs/chunkpost/latest")]
//! Public API for the `chunkpost` library.
//!
//! This crate lets a chat client send files larger than its upload limit. A
//! file is cut into numbered chunk blobs that are uploaded as ordinary
//! attachments; a later scan of the message history finds complete chunk
//! sets, and a download fetches and reassembles them byte for byte.
//!
//! The host plugs in through the traits in [`host`] and drives everything
//! through a [`ChunkSession`].

pub mod chunk;
pub mod config;
pub mod deletion;
pub mod error;
pub mod host;
pub mod metrics;
pub mod reassembly;
pub mod registry;
pub mod session;
pub mod upload;

pub use chunk::{
    CHUNK_EXTENSION,
    CHUNK_MAGIC,
    ChunkHeader,
    ChunkIndex,
    ChunkName,
    EncodingError,
    HeaderError,
    MAX_CHUNKS,
    decode_header,
    encode_header,
};
pub use config::{ConfigError, Settings, SettingsBuilder};
pub use deletion::{DeletionError, DeletionReport};
pub use error::{Error, Result};
pub use host::HostCapabilities;
pub use reassembly::{ChunkDownloader, DownloadError, LocalDirectorySaver, ReassemblyError, reassemble};
pub use registry::{DownloadGroup, DownloadRegistry, GroupDefect, ScanResult};
pub use session::{BatchUploadReport, ChunkSession, UploadOutcome};
pub use upload::{ChunkSet, NamedBlob, UploadError, UploadPlan, UploadSplitter};
