//! The context object tying settings, scan state and host capabilities
//! together.
//!
//! A host creates one [`ChunkSession`] per client and routes its events to
//! it: upload requests, message list refreshes, download clicks and message
//! deletions.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use bytes::Bytes;
use tracing::Instrument;

use crate::{
    config::Settings,
    deletion::{DeletionError, DeletionReport, delete_staggered, plan_deletion},
    host::{ChannelId, HostCapabilities, HostError, Message, MessageId, NoticeLevel},
    reassembly::{ChunkDownloader, DownloadError},
    registry::{DownloadGroup, DownloadRegistry, ScanResult},
    upload::{
        BatchPacer,
        NamedBlob,
        UploadError,
        UploadFile,
        UploadPlan,
        UploadSplitter,
        partition_uploads,
    },
};

/// What [`ChunkSession::upload`] sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The file fitted and was sent unmodified.
    PassThrough,
    /// The file was sent as chunks.
    Chunked {
        /// Number of chunk blobs uploaded.
        chunks: usize,
    },
}

/// What [`ChunkSession::upload_many`] sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchUploadReport {
    /// Files sent unmodified.
    pub unmodified: usize,
    /// Files sent as chunks.
    pub chunked_files: usize,
    /// Chunk blobs uploaded across all chunked files.
    pub chunks: usize,
}

/// Per-client chunk upload and download state.
pub struct ChunkSession {
    settings: Settings,
    host: HostCapabilities,
    registry: DownloadRegistry,
    downloader: ChunkDownloader,
    latest: RwLock<Arc<ScanResult>>,
}

impl ChunkSession {
    /// Create a session over `host` using `settings`.
    ///
    /// Out-of-range values are repaired with [`Settings::sanitized`].
    #[must_use]
    pub fn new(settings: Settings, host: HostCapabilities) -> Self {
        let downloader = ChunkDownloader::new(host.fetcher.clone(), host.saver.clone());
        Self {
            settings: settings.sanitized(),
            host,
            registry: DownloadRegistry::new(),
            downloader,
            latest: RwLock::new(Arc::new(ScanResult::default())),
        }
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &Settings { &self.settings }

    /// Registry backing the scans.
    #[must_use]
    pub fn registry(&self) -> &DownloadRegistry { &self.registry }

    /// Result of the most recent scan.
    #[must_use]
    pub fn latest_scan(&self) -> Arc<ScanResult> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Build a splitter for the upload limit of `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::UploadSizeUnavailable`] when the host reports
    /// no usable limit.
    pub async fn splitter_for(&self, destination: ChannelId) -> Result<UploadSplitter, UploadError> {
        let limit = self.host.uploader.max_single_upload_size(destination).await;
        UploadSplitter::for_host_limit(limit)
    }

    /// Decide how a file the user asked to upload should be sent.
    ///
    /// The user is notified when the upload cannot proceed.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::UploadSizeUnavailable`] when the host reports
    /// no usable limit and [`UploadError::TooManyChunks`] when the file needs
    /// more than 256 chunks.
    pub async fn on_upload_requested(
        &self,
        file_name: &str,
        data: &[u8],
        destination: ChannelId,
    ) -> Result<UploadPlan, UploadError> {
        let plan = match self.splitter_for(destination).await {
            Ok(splitter) => splitter.plan(file_name, data),
            Err(e) => Err(e),
        };
        if let Err(e) = &plan {
            self.notify_upload_error(e);
        }
        plan
    }

    /// Send a file, chunking and pacing it when it exceeds the upload limit.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::on_upload_requested`] and
    /// [`UploadError::Transport`] when the host rejects a batch.
    pub async fn upload(
        &self,
        file_name: &str,
        data: Bytes,
        destination: ChannelId,
    ) -> Result<UploadOutcome, UploadError> {
        let span = tracing::info_span!(
            "chunk.upload",
            file = file_name,
            bytes = data.len(),
            channel = %destination
        );
        self.send(file_name, data, destination).instrument(span).await
    }

    async fn send(
        &self,
        file_name: &str,
        data: Bytes,
        destination: ChannelId,
    ) -> Result<UploadOutcome, UploadError> {
        match self.on_upload_requested(file_name, &data, destination).await? {
            UploadPlan::Unmodified => {
                self.host
                    .uploader
                    .upload_batch(destination, vec![NamedBlob::new(file_name, data)])
                    .await
                    .map_err(|source| UploadError::Transport { batch: 0, source })?;
                Ok(UploadOutcome::PassThrough)
            }
            UploadPlan::Chunked(set) => {
                let chunks = BatchPacer::from_settings(&self.settings)
                    .upload(self.host.uploader.as_ref(), destination, set.into_blobs())
                    .await?;
                Ok(UploadOutcome::Chunked { chunks })
            }
        }
    }

    /// Read `path` and send it with [`Self::upload`].
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Io`] if the file cannot be read, otherwise as
    /// [`Self::upload`].
    pub async fn upload_path(
        &self,
        path: &Path,
        destination: ChannelId,
    ) -> Result<UploadOutcome, UploadError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.upload(&file_name, Bytes::from(data), destination).await
    }

    /// Send several files at once.
    ///
    /// Files that fit go out together in one batch. Oversized files are
    /// chunked and their blobs paced; when more than one file is chunked,
    /// blobs are sent one per batch.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::TooManyChunks`] if any file needs more than 256
    /// chunks, in which case nothing is sent, and [`UploadError::Transport`]
    /// when the host rejects a batch.
    pub async fn upload_many(
        &self,
        files: Vec<UploadFile>,
        destination: ChannelId,
    ) -> Result<BatchUploadReport, UploadError> {
        let partition = match self.splitter_for(destination).await {
            Ok(splitter) => partition_uploads(files, &splitter),
            Err(e) => Err(e),
        }
        .inspect_err(|e| self.notify_upload_error(e))?;

        let mut pacer = BatchPacer::from_settings(&self.settings);
        if partition.disables_batching() {
            pacer = pacer.unbatched();
        }
        let mut report = BatchUploadReport {
            unmodified: partition.unmodified.len(),
            chunked_files: partition.chunked.len(),
            chunks: 0,
        };
        if !partition.unmodified.is_empty() {
            let blobs = partition
                .unmodified
                .into_iter()
                .map(|file| NamedBlob::new(file.name, file.data))
                .collect();
            self.host
                .uploader
                .upload_batch(destination, blobs)
                .await
                .map_err(|source| UploadError::Transport { batch: 0, source })?;
        }
        let blobs: Vec<NamedBlob> = partition
            .chunked
            .into_iter()
            .flat_map(|set| set.into_blobs())
            .collect();
        report.chunks = pacer
            .upload(self.host.uploader.as_ref(), destination, blobs)
            .await?;
        Ok(report)
    }

    /// Scan `messages` and make the result the latest scan.
    pub fn on_scan_requested(&self, messages: &[Message]) -> Arc<ScanResult> {
        let scan = Arc::new(self.registry.scan(messages));
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&scan);
        scan
    }

    /// List the messages of `channel` and scan them.
    ///
    /// # Errors
    ///
    /// Returns the host error if the messages cannot be listed.
    pub async fn refresh(&self, channel: ChannelId) -> Result<Arc<ScanResult>, HostError> {
        let messages = self.host.messages.list_messages(channel).await?;
        Ok(self.on_scan_requested(&messages))
    }

    /// Rebuild `group` and save it, notifying the user of the outcome.
    ///
    /// The group is resolved as captured; later scans do not affect it.
    ///
    /// # Errors
    ///
    /// Returns any [`DownloadError`] raised while fetching, reassembling or
    /// saving.
    pub async fn on_download_requested(
        &self,
        group: Arc<DownloadGroup>,
    ) -> Result<PathBuf, DownloadError> {
        let notifier = &self.host.notifier;
        notifier.notify(NoticeLevel::Info, "Downloading files...");
        match self.downloader.download(&group).await {
            Ok(path) => {
                notifier.notify(NoticeLevel::Success, "File reassembled successfully");
                if self.settings.open_after_save() {
                    notifier.reveal(&path);
                }
                Ok(path)
            }
            Err(e) => {
                notifier.notify(NoticeLevel::Error, &format!("Reassembly failed: {e}"));
                Err(e)
            }
        }
    }

    /// Whether the current user may delete the messages of `group`.
    #[must_use]
    pub fn can_delete(&self, group: &DownloadGroup) -> bool {
        let identity = &self.host.identity;
        identity.current_user() == Some(group.owner())
            || identity.can_manage_messages(group.channel())
    }

    /// Delete every message of `group` except `exclude`, one per deletion
    /// delay.
    ///
    /// # Errors
    ///
    /// Returns [`DeletionError::NotPermitted`] when [`Self::can_delete`]
    /// refuses.
    pub async fn delete_download(
        &self,
        group: &DownloadGroup,
        exclude: Option<MessageId>,
    ) -> Result<DeletionReport, DeletionError> {
        if !self.can_delete(group) {
            return Err(DeletionError::NotPermitted {
                group: group.id(),
                user: self.host.identity.current_user(),
            });
        }
        let targets = plan_deletion(group, exclude);
        log::info!(
            "deleting {} messages of chunk group {} ({})",
            targets.len(),
            group.id(),
            group.filename()
        );
        let report = delete_staggered(
            self.host.deleter.as_ref(),
            group.channel(),
            targets,
            self.settings.deletion_delay(),
        )
        .await;
        for id in &report.deleted {
            self.registry.forget(*id);
        }
        Ok(report)
    }

    /// React to `message` being deleted by deleting the rest of its ready
    /// group in the latest scan.
    ///
    /// Returns `None` when the message belongs to no ready group or the user
    /// may not delete the group.
    pub async fn on_message_deleted(&self, message: MessageId) -> Option<DeletionReport> {
        self.registry.forget(message);
        let scan = self.latest_scan();
        let group = scan.group_for_message(message)?;
        match self.delete_download(group, Some(message)).await {
            Ok(report) => Some(report),
            Err(e) => {
                log::debug!("not cascading deletion of message {message}: {e}");
                None
            }
        }
    }

    fn notify_upload_error(&self, error: &UploadError) {
        let text = match error {
            UploadError::TooManyChunks { .. } => "File size exceeds max chunk count of 256.",
            UploadError::UploadSizeUnavailable => "Failed to get max file upload size.",
            _ => return,
        };
        self.host.notifier.notify(NoticeLevel::Error, text);
    }
}

impl std::fmt::Debug for ChunkSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkSession")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
