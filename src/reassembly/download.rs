//! Fetch, stage and rebuild one download group.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::join_all;
use tracing::Instrument;

use super::{DownloadError, reassemble};
use crate::{
    host::{Fetcher, FileSaver},
    metrics::{self, Outcome},
    registry::DownloadGroup,
};

/// Prefix of the per-download staging directory.
pub const STAGING_PREFIX: &str = "dlfc-download-";

/// Drives the I/O around [`reassemble`].
///
/// Every chunk of the group is fetched concurrently and written to a private
/// staging directory. Reassembly starts only once every fetch has settled,
/// and the staging directory is removed on every exit path.
#[derive(Clone)]
pub struct ChunkDownloader {
    fetcher: Arc<dyn Fetcher>,
    saver: Arc<dyn FileSaver>,
    staging_root: Option<PathBuf>,
}

impl ChunkDownloader {
    /// Create a downloader over the given host capabilities.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, saver: Arc<dyn FileSaver>) -> Self {
        Self {
            fetcher,
            saver,
            staging_root: None,
        }
    }

    /// Create staging directories under `root` instead of the system
    /// temporary directory.
    #[must_use]
    pub fn with_staging_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    /// Directory staging areas are created in, if overridden.
    #[must_use]
    pub fn staging_dir(&self) -> Option<&Path> { self.staging_root.as_deref() }

    /// Rebuild `group` and save it under its original name.
    ///
    /// Returns the path the saver wrote.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::FetchFailure`] if any chunk cannot be
    /// fetched, [`DownloadError::Reassembly`] if the fetched chunks are
    /// inconsistent or incomplete, [`DownloadError::Staging`] on local I/O
    /// failure and [`DownloadError::Save`] if the saver fails.
    pub async fn download(&self, group: &DownloadGroup) -> Result<PathBuf, DownloadError> {
        let span = tracing::info_span!(
            "chunk.download",
            group = %group.id(),
            file = group.filename(),
            chunks = group.sources().len()
        );
        let result = self.fetch_and_rebuild(group).instrument(span).await;
        metrics::inc_reassemblies(if result.is_ok() {
            Outcome::Success
        } else {
            Outcome::Failure
        });
        result
    }

    async fn fetch_and_rebuild(&self, group: &DownloadGroup) -> Result<PathBuf, DownloadError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);
        let staging = match &self.staging_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let fetches = group.sources().iter().map(|source| async move {
            (source, self.fetcher.fetch_bytes(&source.url).await)
        });
        let fetched = join_all(fetches).await;

        let mut staged = Vec::with_capacity(fetched.len());
        for (position, (source, result)) in fetched.into_iter().enumerate() {
            let bytes = result.map_err(|e| DownloadError::FetchFailure {
                url: source.url.clone(),
                source: e,
            })?;
            let path = staging.path().join(format!("{position}.chunk"));
            tokio::fs::write(&path, &bytes).await?;
            staged.push(path);
        }

        let mut buffers = Vec::with_capacity(staged.len());
        for path in &staged {
            buffers.push(tokio::fs::read(path).await?);
        }
        let data = reassemble(&buffers)?;
        log::debug!(
            "reassembled {} from {} chunks ({} bytes)",
            group.filename(),
            buffers.len(),
            data.len()
        );

        self.saver
            .save_bytes(group.filename(), &data)
            .await
            .map_err(|source| DownloadError::Save {
                filename: group.filename().to_owned(),
                source,
            })
    }
}

impl std::fmt::Debug for ChunkDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkDownloader").finish_non_exhaustive()
    }
}
