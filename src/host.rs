//! Capabilities the embedding chat client supplies.
//!
//! Every interaction with the outside world (listing messages, uploading and
//! fetching attachments, deleting messages, saving files, notifying the
//! user) goes through one of the narrow traits defined here. A
//! [`HostCapabilities`] bundle is injected into
//! [`ChunkSession`](crate::session::ChunkSession) at construction so the core
//! never reaches for global state.

use std::{
    error::Error as StdError,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use async_trait::async_trait;
use bytes::Bytes;
use derive_more::{Display, From};

use crate::upload::NamedBlob;

/// Boxed error returned by host callbacks.
pub type HostError = Box<dyn StdError + Send + Sync>;

macro_rules! host_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
        #[display("{_0}")]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw host identifier.
            #[must_use]
            pub const fn new(value: u64) -> Self { Self(value) }

            /// Return the raw host identifier.
            #[must_use]
            pub const fn get(self) -> u64 { self.0 }
        }
    };
}

host_id!(
    /// Identifier of a chat message.
    MessageId
);
host_id!(
    /// Identifier of a channel messages are posted to.
    ChannelId
);
host_id!(
    /// Identifier of a chat user.
    UserId
);
host_id!(
    /// Identifier of an uploaded attachment.
    AttachmentId
);

/// Attachment metadata as reported by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Host identifier of the attachment.
    pub id: AttachmentId,
    /// File name the attachment was uploaded under.
    pub filename: String,
    /// Location the attachment bytes can be fetched from.
    pub url: String,
    /// Declared size in bytes.
    pub size: u64,
}

/// A message and its attachments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Host identifier of the message.
    pub id: MessageId,
    /// Channel the message was posted to.
    pub channel: ChannelId,
    /// When the message was sent.
    pub timestamp: SystemTime,
    /// Author of the message.
    pub author: UserId,
    /// Attachments carried by the message.
    pub attachments: Vec<Attachment>,
}

/// Severity of a user-facing notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    /// Progress information.
    Info,
    /// An operation finished.
    Success,
    /// An operation failed.
    Error,
}

/// Uploads named blobs to a destination channel.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Largest single upload the host accepts for `destination`, already
    /// reduced by any transport overhead. `None` when the host cannot tell.
    async fn max_single_upload_size(&self, destination: ChannelId) -> Option<u64>;

    /// Upload `blobs` as one batch to `destination`.
    async fn upload_batch(
        &self,
        destination: ChannelId,
        blobs: Vec<NamedBlob>,
    ) -> Result<(), HostError>;
}

/// Lists the messages currently visible in a channel.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Return the messages of `channel` in any order.
    async fn list_messages(&self, channel: ChannelId) -> Result<Vec<Message>, HostError>;
}

/// Deletes messages.
#[async_trait]
pub trait MessageDeleter: Send + Sync {
    /// Delete `message` from `channel`.
    async fn delete_message(&self, channel: ChannelId, message: MessageId)
    -> Result<(), HostError>;
}

/// Fetches attachment bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Return the body served at `url`.
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, HostError>;
}

/// Persists a reassembled file.
#[async_trait]
pub trait FileSaver: Send + Sync {
    /// Save `bytes` under `filename`, returning the path actually written.
    async fn save_bytes(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, HostError>;
}

/// Surfaces progress and failures to the user.
pub trait Notifier: Send + Sync {
    /// Show `message` at `level`.
    fn notify(&self, level: NoticeLevel, message: &str);

    /// Reveal a saved file in the platform file browser.
    fn reveal(&self, path: &Path) { let _ = path; }
}

/// Answers who the current user is and what they may do.
pub trait Identity: Send + Sync {
    /// The logged-in user, if known.
    fn current_user(&self) -> Option<UserId>;

    /// Whether the current user may delete other people's messages in
    /// `channel`.
    fn can_manage_messages(&self, channel: ChannelId) -> bool;
}

/// Notifier that routes notices to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => log::warn!("{message}"),
            NoticeLevel::Info | NoticeLevel::Success => log::info!("{message}"),
        }
    }

    fn reveal(&self, path: &Path) { log::info!("saved file at {}", path.display()); }
}

/// Every capability a [`ChunkSession`](crate::session::ChunkSession) needs.
#[derive(Clone)]
pub struct HostCapabilities {
    /// Attachment upload transport.
    pub uploader: Arc<dyn Uploader>,
    /// Message listing.
    pub messages: Arc<dyn MessageSource>,
    /// Message deletion.
    pub deleter: Arc<dyn MessageDeleter>,
    /// Attachment download transport.
    pub fetcher: Arc<dyn Fetcher>,
    /// Destination for reassembled files.
    pub saver: Arc<dyn FileSaver>,
    /// User-facing notices.
    pub notifier: Arc<dyn Notifier>,
    /// Current user and permissions.
    pub identity: Arc<dyn Identity>,
}

impl std::fmt::Debug for HostCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCapabilities").finish_non_exhaustive()
    }
}
