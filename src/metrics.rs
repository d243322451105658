//! Metric helpers for `chunkpost`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled every helper is a no-op.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking chunk blobs handed to the host uploader.
pub const CHUNKS_UPLOADED: &str = "chunkpost_chunks_uploaded_total";
/// Name of the counter tracking chunk groups found by scans.
pub const GROUPS_SCANNED: &str = "chunkpost_groups_scanned_total";
/// Name of the counter tracking download attempts.
pub const REASSEMBLIES: &str = "chunkpost_reassemblies_total";

/// Validation state of a scanned group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupState {
    /// The group passed validation.
    Ready,
    /// The group is missing chunks or has conflicting names.
    Incomplete,
}

impl GroupState {
    /// Label value recorded for this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            GroupState::Ready => "ready",
            GroupState::Incomplete => "incomplete",
        }
    }
}

/// Result of a download attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The file was rebuilt and saved.
    Success,
    /// Fetching, reassembly or saving failed.
    Failure,
}

impl Outcome {
    /// Label value recorded for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Record `count` chunk blobs uploaded.
pub fn inc_chunks_uploaded(count: usize) {
    #[cfg(feature = "metrics")]
    counter!(CHUNKS_UPLOADED).increment(u64::try_from(count).unwrap_or(u64::MAX));
    #[cfg(not(feature = "metrics"))]
    let _ = count;
}

/// Record a group found by a scan.
pub fn inc_groups_scanned(state: GroupState) {
    #[cfg(feature = "metrics")]
    counter!(GROUPS_SCANNED, "state" => state.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = state;
}

/// Record a download attempt.
pub fn inc_reassemblies(outcome: Outcome) {
    #[cfg(feature = "metrics")]
    counter!(REASSEMBLIES, "outcome" => outcome.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}
