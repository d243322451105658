//! Inbound path: fetch the chunks of a ready group, verify their headers and
//! rebuild the original file.
//!
//! [`reassemble`] is the pure part: it trusts nothing but the binary headers
//! of the buffers it is given. [`ChunkDownloader`] drives the I/O around it,
//! and [`LocalDirectorySaver`] is a [`FileSaver`](crate::host::FileSaver) for
//! hosts that save into a plain directory.

pub mod download;
pub mod error;
pub mod reassembler;
pub mod saver;

pub use download::ChunkDownloader;
pub use error::{DownloadError, HeaderConflict, ReassemblyError};
pub use reassembler::reassemble;
pub use saver::{LocalDirectorySaver, MAX_SOFT_COPY_ATTEMPTS};
