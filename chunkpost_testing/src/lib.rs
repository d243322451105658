//! Test support for `chunkpost`.
//!
//! Provides an in-memory chat host implementing every capability trait, log
//! capture for asserting on diagnostics, and builders for message fixtures.
//!
//! ```rust
//! use chunkpost::{ChunkSession, Settings};
//! use chunkpost_testing::InMemoryHost;
//!
//! let host = InMemoryHost::new();
//! let session = ChunkSession::new(Settings::default(), host.capabilities());
//! assert!(session.latest_scan().ready().is_empty());
//! ```

pub mod logging;
pub mod memory_host;
pub mod messages;

pub use logging::{LoggerHandle, logger};
pub use memory_host::{InMemoryHost, RecordedDeletion, RecordedUpload, host};
pub use messages::{at, attachment, chunk_message};
