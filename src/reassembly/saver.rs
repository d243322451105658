//! Save reassembled files into a local directory without overwriting.

use std::{
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};

use crate::{
    config::{Settings, default_save_directory},
    host::{FileSaver, HostError},
};

/// Numbered copies tried before falling back to a random suffix.
pub const MAX_SOFT_COPY_ATTEMPTS: u32 = 256;

/// [`FileSaver`] writing into a directory on the local file system.
///
/// An existing file is never replaced: `report.pdf` becomes
/// `report (1).pdf`, `report (2).pdf` and so on, up to
/// [`MAX_SOFT_COPY_ATTEMPTS`], after which a random suffix is used. When the
/// configured directory does not exist the fallback directory is used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDirectorySaver {
    directory: PathBuf,
    fallback: PathBuf,
}

impl LocalDirectorySaver {
    /// Save into `directory`, falling back to the user's downloads folder.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_fallback(directory, default_save_directory())
    }

    /// Save into `directory`, falling back to `fallback`.
    #[must_use]
    pub fn with_fallback(directory: impl Into<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            fallback: fallback.into(),
        }
    }

    /// Save into the configured save directory.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self { Self::new(settings.save_directory()) }

    async fn target_directory(&self) -> io::Result<&Path> {
        if fs::metadata(&self.directory).await.is_ok_and(|m| m.is_dir()) {
            return Ok(&self.directory);
        }
        log::warn!(
            "save directory {} unavailable; using {}",
            self.directory.display(),
            self.fallback.display()
        );
        fs::create_dir_all(&self.fallback).await?;
        Ok(&self.fallback)
    }
}

#[async_trait]
impl FileSaver for LocalDirectorySaver {
    async fn save_bytes(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, HostError> {
        let directory = self.target_directory().await?;
        let filename = sanitize(filename);
        for attempt in 0..=MAX_SOFT_COPY_ATTEMPTS {
            let path = directory.join(soft_copy_name(filename, attempt));
            match create_new(&path, bytes).await {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }

        let (stem, extension) = split_name(filename);
        let (_, path) = tempfile::Builder::new()
            .prefix(&format!("{stem} "))
            .suffix(&extension.map(|e| format!(".{e}")).unwrap_or_default())
            .tempfile_in(directory)?
            .keep()?;
        fs::write(&path, bytes).await?;
        Ok(path)
    }
}

async fn create_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await
}

/// Keep only the final path component of a name taken from an attachment.
fn sanitize(filename: &str) -> &str {
    Path::new(filename)
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("download")
}

fn split_name(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (filename, None),
    }
}

/// `name.ext` for attempt zero, `name (n).ext` afterwards.
fn soft_copy_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_owned();
    }
    match split_name(filename) {
        (stem, Some(extension)) => format!("{stem} ({attempt}).{extension}"),
        (stem, None) => format!("{stem} ({attempt})"),
    }
}
