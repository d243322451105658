//! An in-memory chat host.
//!
//! [`InMemoryHost`] implements every capability trait over shared state so a
//! test can drive a [`ChunkSession`](chunkpost::ChunkSession) end to end and
//! then inspect what was uploaded, deleted, saved and shown to the user.
//! Uploaded batches are published as messages whose attachments are served
//! back by the fetcher, so an upload can be scanned and downloaded again.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{
        Arc,
        Mutex,
        MutexGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use chunkpost::{
    HostCapabilities,
    NamedBlob,
    host::{
        Attachment,
        AttachmentId,
        ChannelId,
        Fetcher,
        FileSaver,
        HostError,
        Identity,
        Message,
        MessageDeleter,
        MessageId,
        MessageSource,
        NoticeLevel,
        Notifier,
        Uploader,
        UserId,
    },
};
use rstest::fixture;
use tokio::time::Instant;

use crate::messages::at;

/// Upload limit reported until a test overrides it.
pub const DEFAULT_UPLOAD_LIMIT: u64 = 1_024;

/// A batch handed to [`Uploader::upload_batch`].
#[derive(Clone, Debug)]
pub struct RecordedUpload {
    /// Destination channel.
    pub channel: ChannelId,
    /// Tokio clock reading when the batch arrived.
    pub at: Instant,
    /// Blobs in the batch.
    pub blobs: Vec<NamedBlob>,
    /// Message the batch was published as.
    pub message: MessageId,
}

/// A call to [`MessageDeleter::delete_message`].
#[derive(Clone, Copy, Debug)]
pub struct RecordedDeletion {
    /// Channel the message was deleted from.
    pub channel: ChannelId,
    /// Deleted message.
    pub message: MessageId,
    /// Tokio clock reading when the deletion was requested.
    pub at: Instant,
    /// Whether the host reported success.
    pub succeeded: bool,
}

#[derive(Debug, Default)]
struct State {
    upload_limit: Option<u64>,
    uploads: Vec<RecordedUpload>,
    messages: Vec<Message>,
    objects: HashMap<String, Bytes>,
    failing_urls: HashSet<String>,
    failing_deletes: HashSet<MessageId>,
    deletions: Vec<RecordedDeletion>,
    saved: Vec<(String, Vec<u8>)>,
    notices: Vec<(NoticeLevel, String)>,
    revealed: Vec<PathBuf>,
    current_user: Option<UserId>,
}

/// Chat host keeping every interaction in memory.
#[derive(Debug)]
pub struct InMemoryHost {
    state: Mutex<State>,
    next_id: AtomicU64,
    manager: AtomicBool,
    reject_uploads: AtomicBool,
}

impl InMemoryHost {
    /// Create a host with a [`DEFAULT_UPLOAD_LIMIT`] upload limit, logged in
    /// as user 1.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                upload_limit: Some(DEFAULT_UPLOAD_LIMIT),
                current_user: Some(UserId::new(1)),
                ..State::default()
            }),
            next_id: AtomicU64::new(1),
            manager: AtomicBool::new(false),
            reject_uploads: AtomicBool::new(false),
        })
    }

    /// Bundle this host as the capabilities of a session.
    #[must_use]
    pub fn capabilities(self: &Arc<Self>) -> HostCapabilities {
        HostCapabilities {
            uploader: self.clone(),
            messages: self.clone(),
            deleter: self.clone(),
            fetcher: self.clone(),
            saver: self.clone(),
            notifier: self.clone(),
            identity: self.clone(),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> { self.state.lock().expect("host state poisoned") }

    fn next_id(&self) -> u64 { self.next_id.fetch_add(1, Ordering::Relaxed) }

    /// Change the reported upload limit.
    pub fn set_upload_limit(&self, limit: Option<u64>) { self.state().upload_limit = limit; }

    /// Make every later upload fail.
    pub fn reject_uploads(&self, reject: bool) { self.reject_uploads.store(reject, Ordering::Relaxed); }

    /// Log in as `user`.
    pub fn set_current_user(&self, user: Option<UserId>) { self.state().current_user = user; }

    /// Grant or revoke the manage-messages permission.
    pub fn set_manager(&self, manager: bool) { self.manager.store(manager, Ordering::Relaxed); }

    /// Serve `bytes` at `url`.
    pub fn serve(&self, url: impl Into<String>, bytes: impl Into<Bytes>) {
        self.state().objects.insert(url.into(), bytes.into());
    }

    /// Make fetches of `url` fail.
    pub fn fail_url(&self, url: impl Into<String>) { self.state().failing_urls.insert(url.into()); }

    /// Make deletion of `message` fail.
    pub fn fail_delete(&self, message: MessageId) { self.state().failing_deletes.insert(message); }

    /// Add a message to the history without uploading anything.
    pub fn push_message(&self, message: Message) { self.state().messages.push(message); }

    /// Batches received so far.
    #[must_use]
    pub fn uploads(&self) -> Vec<RecordedUpload> { self.state().uploads.clone() }

    /// Names of every uploaded blob, in upload order.
    #[must_use]
    pub fn uploaded_names(&self) -> Vec<String> {
        self.state()
            .uploads
            .iter()
            .flat_map(|u| u.blobs.iter().map(|b| b.name().to_owned()))
            .collect()
    }

    /// Current message history.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> { self.state().messages.clone() }

    /// Deletion requests so far.
    #[must_use]
    pub fn deletions(&self) -> Vec<RecordedDeletion> { self.state().deletions.clone() }

    /// Files saved so far, as `(filename, bytes)`.
    #[must_use]
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> { self.state().saved.clone() }

    /// Notices shown so far.
    #[must_use]
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> { self.state().notices.clone() }

    /// Paths revealed so far.
    #[must_use]
    pub fn revealed(&self) -> Vec<PathBuf> { self.state().revealed.clone() }
}

#[async_trait]
impl Uploader for InMemoryHost {
    async fn max_single_upload_size(&self, _destination: ChannelId) -> Option<u64> {
        self.state().upload_limit
    }

    async fn upload_batch(
        &self,
        destination: ChannelId,
        blobs: Vec<NamedBlob>,
    ) -> Result<(), HostError> {
        if self.reject_uploads.load(Ordering::Relaxed) {
            return Err("upload rejected".into());
        }
        let message_id = MessageId::new(self.next_id());
        let attachments: Vec<Attachment> = blobs
            .iter()
            .map(|blob| {
                let id = self.next_id();
                Attachment {
                    id: AttachmentId::new(id),
                    filename: blob.name().to_owned(),
                    url: format!("mem://{id}"),
                    size: blob.len() as u64,
                }
            })
            .collect();

        let mut state = self.state();
        let author = state.current_user.unwrap_or(UserId::new(0));
        for (attachment, blob) in attachments.iter().zip(&blobs) {
            state
                .objects
                .insert(attachment.url.clone(), blob.bytes().clone());
        }
        state.messages.push(Message {
            id: message_id,
            channel: destination,
            timestamp: at(message_id.get()),
            author,
            attachments,
        });
        state.uploads.push(RecordedUpload {
            channel: destination,
            at: Instant::now(),
            blobs,
            message: message_id,
        });
        Ok(())
    }
}

#[async_trait]
impl MessageSource for InMemoryHost {
    async fn list_messages(&self, channel: ChannelId) -> Result<Vec<Message>, HostError> {
        Ok(self
            .state()
            .messages
            .iter()
            .filter(|m| m.channel == channel)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MessageDeleter for InMemoryHost {
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), HostError> {
        let mut state = self.state();
        let succeeded = !state.failing_deletes.contains(&message);
        state.deletions.push(RecordedDeletion {
            channel,
            message,
            at: Instant::now(),
            succeeded,
        });
        if !succeeded {
            return Err(format!("cannot delete message {message}").into());
        }
        state.messages.retain(|m| m.id != message);
        Ok(())
    }
}

#[async_trait]
impl Fetcher for InMemoryHost {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, HostError> {
        let state = self.state();
        if state.failing_urls.contains(url) {
            return Err(format!("fetch of {url} failed").into());
        }
        state
            .objects
            .get(url)
            .cloned()
            .ok_or_else(|| format!("nothing served at {url}").into())
    }
}

#[async_trait]
impl FileSaver for InMemoryHost {
    async fn save_bytes(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, HostError> {
        self.state().saved.push((filename.to_owned(), bytes.to_vec()));
        Ok(Path::new("/saved").join(filename))
    }
}

impl Notifier for InMemoryHost {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.state().notices.push((level, message.to_owned()));
    }

    fn reveal(&self, path: &Path) { self.state().revealed.push(path.to_path_buf()); }
}

impl Identity for InMemoryHost {
    fn current_user(&self) -> Option<UserId> { self.state().current_user }

    fn can_manage_messages(&self, _channel: ChannelId) -> bool { self.manager.load(Ordering::Relaxed) }
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn host() -> Arc<InMemoryHost> { InMemoryHost::new() }
