//! Discovery of chunk sets scattered across a message history.
//!
//! [`DownloadRegistry::scan`] walks a batch of messages, groups chunk
//! attachments by their recovered original name, and validates that each
//! group covers its declared index range. The result is an owned
//! [`ScanResult`] that replaces the previous one wholesale; the only state
//! carried between scans is a memo of messages known to hold no chunks.

pub mod group;
pub mod scan;

pub use group::{ChunkSource, DownloadGroup, GroupDefect, GroupId, MessageRef};
pub use scan::{DownloadRegistry, IncompleteDownload, ScanResult};

#[cfg(test)]
mod tests;
