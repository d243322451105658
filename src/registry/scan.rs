//! Message scanning and the scan snapshot it produces.

use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::DashSet;

use super::{DownloadGroup, GroupDefect, GroupId};
use crate::{
    chunk::ChunkName,
    host::{Message, MessageId},
    metrics::{self, GroupState},
};

/// A group that failed validation, kept so its fragments can be cleaned up.
#[derive(Clone, Debug)]
pub struct IncompleteDownload {
    group: Arc<DownloadGroup>,
    defect: GroupDefect,
}

impl IncompleteDownload {
    /// The partial group.
    #[must_use]
    pub fn group(&self) -> &Arc<DownloadGroup> { &self.group }

    /// Why the group is not ready.
    #[must_use]
    pub fn defect(&self) -> &GroupDefect { &self.defect }
}

/// Groups discovered by one scan.
///
/// Duplicate uploads of the same file are legal, so ready groups are kept in
/// creation order rather than keyed by name.
#[derive(Clone, Debug, Default)]
pub struct ScanResult {
    generation: u64,
    ready: Vec<Arc<DownloadGroup>>,
    incomplete: Vec<IncompleteDownload>,
}

impl ScanResult {
    /// Sequence number of the scan; later scans have larger numbers.
    #[must_use]
    pub const fn generation(&self) -> u64 { self.generation }

    /// Groups that passed validation.
    #[must_use]
    pub fn ready(&self) -> &[Arc<DownloadGroup>] { &self.ready }

    /// Groups that failed validation.
    #[must_use]
    pub fn incomplete(&self) -> &[IncompleteDownload] { &self.incomplete }

    /// Ready groups reconstructing `filename`.
    pub fn ready_named<'a>(
        &'a self,
        filename: &'a str,
    ) -> impl Iterator<Item = &'a Arc<DownloadGroup>> + 'a {
        self.ready.iter().filter(move |g| g.filename() == filename)
    }

    /// Ready group `message` contributed to.
    #[must_use]
    pub fn group_for_message(&self, message: MessageId) -> Option<&Arc<DownloadGroup>> {
        self.ready.iter().find(|g| g.contains_message(message))
    }

    /// Incomplete group `message` contributed to.
    #[must_use]
    pub fn incomplete_for_message(&self, message: MessageId) -> Option<&IncompleteDownload> {
        self.incomplete
            .iter()
            .find(|i| i.group.contains_message(message))
    }

    /// Messages the host should hide: every non-primary member of a ready
    /// group.
    #[must_use]
    pub fn hidden_messages(&self) -> HashSet<MessageId> {
        self.ready.iter().flat_map(|g| g.hidden_messages()).collect()
    }

    /// Whether `message` should be hidden.
    #[must_use]
    pub fn is_hidden(&self, message: MessageId) -> bool {
        self.ready
            .iter()
            .any(|g| g.contains_message(message) && g.primary_message() != Some(message))
    }
}

/// Builds [`ScanResult`]s from message batches.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, UNIX_EPOCH};
///
/// use chunkpost::{
///     host::{Attachment, AttachmentId, ChannelId, Message, MessageId, UserId},
///     registry::DownloadRegistry,
/// };
///
/// let message = Message {
///     id: MessageId::new(1),
///     channel: ChannelId::new(9),
///     timestamp: UNIX_EPOCH + Duration::from_secs(60),
///     author: UserId::new(4),
///     attachments: vec![Attachment {
///         id: AttachmentId::new(1),
///         filename: "0-0_notes.txt.dlfc".into(),
///         url: "mem://1".into(),
///         size: 12,
///     }],
/// };
/// let registry = DownloadRegistry::new();
/// let scan = registry.scan(&[message]);
/// assert_eq!(scan.ready().len(), 1);
/// assert_eq!(scan.ready()[0].filename(), "notes.txt");
/// ```
#[derive(Debug, Default)]
pub struct DownloadRegistry {
    no_chunks: DashSet<MessageId>,
    next_group_id: AtomicU64,
    generation: AtomicU64,
}

impl DownloadRegistry {
    /// Create a registry with an empty skip memo.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Group the chunk attachments found in `messages`.
    ///
    /// Messages are visited in send order. Each chunk joins the most recently
    /// created group with the same original name that has not yet seen its
    /// index; otherwise it starts a new group, so two uploads of the same
    /// file yield two groups. Attachments whose names do not parse are
    /// ignored. Messages without any chunk are remembered and skipped by
    /// later scans.
    #[must_use]
    pub fn scan(&self, messages: &[Message]) -> ScanResult {
        let mut ordered: Vec<&Message> = messages
            .iter()
            .filter(|m| !self.no_chunks.contains(&m.id))
            .collect();
        ordered.sort_by_key(|m| (m.timestamp, m.id));

        let mut workspace: Vec<DownloadGroup> = Vec::new();
        for message in ordered {
            let mut found = false;
            for attachment in &message.attachments {
                let Some(name) = ChunkName::parse(&attachment.filename) else {
                    continue;
                };
                found = true;
                if let Some(group) = workspace
                    .iter_mut()
                    .rev()
                    .find(|g| g.filename() == name.original() && !g.has_index(name.index()))
                {
                    group.record(message, attachment, &name);
                } else {
                    let mut group = DownloadGroup::new(
                        self.next_group_id(),
                        name.original(),
                        message.channel,
                        message.author,
                    );
                    group.record(message, attachment, &name);
                    workspace.push(group);
                }
            }
            if !found {
                self.no_chunks.insert(message.id);
            }
        }

        let mut result = ScanResult {
            generation: self.generation.fetch_add(1, Ordering::Relaxed) + 1,
            ..ScanResult::default()
        };
        for mut group in workspace {
            group.finalize();
            match group.validate() {
                Ok(()) => {
                    metrics::inc_groups_scanned(GroupState::Ready);
                    result.ready.push(Arc::new(group));
                }
                Err(defect) => {
                    log::debug!(
                        "chunk group {} ({}) incomplete: {defect}",
                        group.id(),
                        group.filename()
                    );
                    metrics::inc_groups_scanned(GroupState::Incomplete);
                    result.incomplete.push(IncompleteDownload {
                        group: Arc::new(group),
                        defect,
                    });
                }
            }
        }
        log::debug!(
            "scan {} found {} ready and {} incomplete chunk groups",
            result.generation,
            result.ready.len(),
            result.incomplete.len()
        );
        result
    }

    /// Drop `message` from the skip memo so the next scan revisits it.
    pub fn forget(&self, message: MessageId) { self.no_chunks.remove(&message); }

    /// Whether `message` is known to hold no chunks.
    #[must_use]
    pub fn is_skipped(&self, message: MessageId) -> bool { self.no_chunks.contains(&message) }

    fn next_group_id(&self) -> GroupId {
        GroupId::new(self.next_group_id.fetch_add(1, Ordering::Relaxed))
    }
}
