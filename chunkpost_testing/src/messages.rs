//! Builders for message fixtures.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chunkpost::host::{Attachment, AttachmentId, ChannelId, Message, MessageId, UserId};

/// Channel used by fixtures that do not care which one.
pub const FIXTURE_CHANNEL: ChannelId = ChannelId::new(1);

/// `secs` seconds after the Unix epoch.
#[must_use]
pub fn at(secs: u64) -> SystemTime { UNIX_EPOCH + Duration::from_secs(secs) }

/// Attachment `name` of `size` bytes served at `mem://{id}`.
#[must_use]
pub fn attachment(id: u64, name: &str, size: u64) -> Attachment {
    Attachment {
        id: AttachmentId::new(id),
        filename: name.to_owned(),
        url: format!("mem://{id}"),
        size,
    }
}

/// Message `id` sent at `secs` by user `id`, carrying one attachment per
/// name.
///
/// Attachment identifiers are derived from the message id so fixtures never
/// collide.
#[must_use]
pub fn chunk_message(id: u64, secs: u64, names: &[&str]) -> Message {
    Message {
        id: MessageId::new(id),
        channel: FIXTURE_CHANNEL,
        timestamp: at(secs),
        author: UserId::new(id),
        attachments: names
            .iter()
            .zip(0_u64..)
            .map(|(name, n)| attachment(id * 1_000 + n, name, 1_000_000))
            .collect(),
    }
}
