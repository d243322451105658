//! A chunk set reconstructed from message attachments.

use std::{collections::BTreeSet, fmt, time::SystemTime};

use derive_more::{Display, From};
use thiserror::Error;

use crate::{
    chunk::{ChunkIndex, ChunkName},
    host::{Attachment, AttachmentId, ChannelId, Message, MessageId, UserId},
};

/// Identifier assigned to a group when a scan creates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("{_0}")]
pub struct GroupId(u64);

impl GroupId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self { Self(value) }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

/// One chunk attachment belonging to a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkSource {
    /// Attachment carrying the chunk.
    pub attachment: AttachmentId,
    /// Message the attachment belongs to.
    pub message: MessageId,
    /// Where the chunk bytes can be fetched.
    pub url: String,
    /// Position recovered from the attachment name.
    pub index: ChunkIndex,
    /// Last index recovered from the attachment name.
    pub count: ChunkIndex,
    /// Declared attachment size in bytes.
    pub size: u64,
}

/// A message contributing chunks to a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageRef {
    /// Host message identifier.
    pub id: MessageId,
    /// When the message was sent.
    pub timestamp: SystemTime,
}

/// Why a group is not ready for download.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GroupDefect {
    /// The group holds no chunks.
    #[error("group holds no chunks")]
    Empty,
    /// Chunks disagree about the size of the set.
    #[error("chunk count mismatch: expected last index {expected}, found {found}")]
    CountMismatch {
        /// Last index declared by the lowest chunk.
        expected: ChunkIndex,
        /// Conflicting last index.
        found: ChunkIndex,
    },
    /// A chunk claims a position past the end of its set.
    #[error("chunk index {index} beyond last index {count}")]
    IndexOutOfRange {
        /// Offending position.
        index: ChunkIndex,
        /// Declared last index.
        count: ChunkIndex,
    },
    /// Some positions in `0..=count` were never seen.
    #[error("missing {} of {total} chunks", .missing.len())]
    MissingChunks {
        /// Absent positions in ascending order.
        missing: Vec<ChunkIndex>,
        /// Chunks the set declares.
        total: usize,
    },
}

/// All chunks of one original file found in a scan.
#[derive(Clone, Debug)]
pub struct DownloadGroup {
    id: GroupId,
    filename: String,
    channel: ChannelId,
    owner: UserId,
    sources: Vec<ChunkSource>,
    messages: Vec<MessageRef>,
    total_size: u64,
    seen: BTreeSet<ChunkIndex>,
}

impl DownloadGroup {
    /// Create an empty group for `filename`, owned by the author of the
    /// message that revealed it.
    #[must_use]
    pub fn new(id: GroupId, filename: impl Into<String>, channel: ChannelId, owner: UserId) -> Self {
        Self {
            id,
            filename: filename.into(),
            channel,
            owner,
            sources: Vec::new(),
            messages: Vec::new(),
            total_size: 0,
            seen: BTreeSet::new(),
        }
    }

    /// Identifier assigned when the group was created.
    #[must_use]
    pub const fn id(&self) -> GroupId { self.id }

    /// Original file name shared by every chunk.
    #[must_use]
    pub fn filename(&self) -> &str { &self.filename }

    /// Channel the first chunk was found in.
    #[must_use]
    pub const fn channel(&self) -> ChannelId { self.channel }

    /// Author of the message that created the group.
    #[must_use]
    pub const fn owner(&self) -> UserId { self.owner }

    /// Chunk sources, in index order once the scan has finished.
    #[must_use]
    pub fn sources(&self) -> &[ChunkSource] { &self.sources }

    /// Contributing messages, earliest first once the scan has finished.
    #[must_use]
    pub fn messages(&self) -> &[MessageRef] { &self.messages }

    /// Sum of the declared chunk sizes.
    #[must_use]
    pub const fn total_size(&self) -> u64 { self.total_size }

    /// Last index declared by the group, if it holds any chunk.
    #[must_use]
    pub fn declared_count(&self) -> Option<ChunkIndex> { self.sources.first().map(|s| s.count) }

    /// Whether a chunk at `index` was already recorded.
    #[must_use]
    pub fn has_index(&self, index: ChunkIndex) -> bool { self.seen.contains(&index) }

    /// Whether `message` contributed to the group.
    #[must_use]
    pub fn contains_message(&self, message: MessageId) -> bool {
        self.messages.iter().any(|m| m.id == message)
    }

    /// The earliest contributing message; the one that stays visible.
    #[must_use]
    pub fn primary_message(&self) -> Option<MessageId> { self.messages.first().map(|m| m.id) }

    /// Every contributing message except the primary one.
    pub fn hidden_messages(&self) -> impl Iterator<Item = MessageId> + '_ {
        self.messages.iter().skip(1).map(|m| m.id)
    }

    /// Fetch locations of every chunk.
    pub fn urls(&self) -> impl Iterator<Item = &str> + '_ { self.sources.iter().map(|s| s.url.as_str()) }

    /// Human readable size, for example `"12.34 MB Chunk File"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chunkpost::{
    ///     host::{ChannelId, UserId},
    ///     registry::{DownloadGroup, GroupId},
    /// };
    ///
    /// let group = DownloadGroup::new(GroupId::new(1), "a.bin", ChannelId::new(1), UserId::new(1));
    /// assert_eq!(group.size_label(), "0.00 MB Chunk File");
    /// ```
    #[must_use]
    pub fn size_label(&self) -> String { SizeLabel(self.total_size).to_string() }

    /// Record a chunk attachment carried by `message`.
    pub fn record(&mut self, message: &Message, attachment: &Attachment, name: &ChunkName) {
        self.seen.insert(name.index());
        self.total_size = self.total_size.saturating_add(attachment.size);
        self.sources.push(ChunkSource {
            attachment: attachment.id,
            message: message.id,
            url: attachment.url.clone(),
            index: name.index(),
            count: name.count(),
            size: attachment.size,
        });
        if !self.contains_message(message.id) {
            self.messages.push(MessageRef {
                id: message.id,
                timestamp: message.timestamp,
            });
        }
    }

    /// Order sources by index and messages by send time.
    pub(crate) fn finalize(&mut self) {
        self.sources.sort_by_key(|s| s.index);
        self.messages.sort_by_key(|m| (m.timestamp, m.id));
    }

    /// Check that the group covers `0..=count` exactly once.
    ///
    /// # Errors
    ///
    /// Returns the first [`GroupDefect`] found.
    pub fn validate(&self) -> Result<(), GroupDefect> {
        let Some(count) = self.declared_count() else {
            return Err(GroupDefect::Empty);
        };
        if let Some(conflict) = self.sources.iter().find(|s| s.count != count) {
            return Err(GroupDefect::CountMismatch {
                expected: count,
                found: conflict.count,
            });
        }
        if let Some(stray) = self.sources.iter().find(|s| s.index > count) {
            return Err(GroupDefect::IndexOutOfRange {
                index: stray.index,
                count,
            });
        }
        let missing: Vec<ChunkIndex> = (0..=count.get())
            .map(ChunkIndex::new)
            .filter(|index| !self.seen.contains(index))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GroupDefect::MissingChunks {
                missing,
                total: count.as_usize() + 1,
            })
        }
    }
}

struct SizeLabel(u64);

impl fmt::Display for SizeLabel {
    #[expect(
        clippy::cast_precision_loss,
        reason = "label shows two decimal places"
    )]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} MB Chunk File", self.0 as f64 / 1_000_000.0)
    }
}
