//! Staggered removal of the messages carrying a chunk set.
//!
//! Deleting dozens of messages at once trips host rate limits, so deletions
//! run one at a time with a fixed pause before each. Failures are logged and
//! reported but never stop the remaining deletions.

use std::time::Duration;

use thiserror::Error;

use crate::{
    host::{ChannelId, MessageDeleter, MessageId, UserId},
    registry::{DownloadGroup, GroupId},
    upload::pacing_limiter,
};

/// Errors refusing a deletion run before it starts.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DeletionError {
    /// The current user neither owns the group nor manages the channel.
    #[error("user {user:?} may not delete chunk group {group}")]
    NotPermitted {
        /// Group whose deletion was refused.
        group: GroupId,
        /// Current user, if known.
        user: Option<UserId>,
    },
}

/// Outcome of a staggered deletion run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Messages the host confirmed deleted, in deletion order.
    pub deleted: Vec<MessageId>,
    /// Messages the host failed to delete, in attempt order.
    pub failed: Vec<MessageId>,
}

impl DeletionReport {
    /// Whether every deletion succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool { self.failed.is_empty() }
}

/// Messages to delete for `group`, newest first, skipping `exclude`.
///
/// The primary message goes last so an interrupted run leaves the visible
/// entry in place.
#[must_use]
pub fn plan_deletion(group: &DownloadGroup, exclude: Option<MessageId>) -> Vec<MessageId> {
    group
        .messages()
        .iter()
        .rev()
        .map(|m| m.id)
        .filter(|id| Some(*id) != exclude)
        .collect()
}

/// Delete `targets` from `channel` one at a time, waiting `delay` before
/// each deletion.
pub async fn delete_staggered(
    deleter: &dyn MessageDeleter,
    channel: ChannelId,
    targets: Vec<MessageId>,
    delay: Duration,
) -> DeletionReport {
    let limiter = pacing_limiter(delay, 0);
    let mut report = DeletionReport::default();
    for message in targets {
        limiter.acquire(1).await;
        match deleter.delete_message(channel, message).await {
            Ok(()) => {
                log::debug!("deleted chunk message {message} from channel {channel}");
                report.deleted.push(message);
            }
            Err(e) => {
                log::warn!("failed to delete chunk message {message}: {e}");
                report.failed.push(message);
            }
        }
    }
    report
}
