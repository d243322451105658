//! User-adjustable settings.
//!
//! [`Settings`] is a plain value the host persists however it likes; the
//! derived `serde` impls fill missing fields with defaults. Use
//! [`SettingsBuilder`] to construct validated settings, or
//! [`Settings::sanitized`] to repair values loaded from storage.

use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed range for [`Settings::upload_batch_size`].
pub const BATCH_SIZE_RANGE: RangeInclusive<usize> = 1..=10;
/// Allowed range, in seconds, for both pacing delays.
pub const DELAY_RANGE_SECS: RangeInclusive<u64> = 6..=12;
/// Default number of chunks uploaded per batch.
pub const DEFAULT_BATCH_SIZE: usize = 3;
/// Default pause between upload batches and between deletions.
pub const DEFAULT_DELAY_SECS: u64 = 9;

/// Which pacing delay a [`ConfigError::InvalidDelay`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayKind {
    /// Pause between upload batches.
    Upload,
    /// Pause between message deletions.
    Deletion,
}

impl DelayKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Deletion => "deletion",
        }
    }
}

/// Errors returned when building [`Settings`].
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The batch size was outside [`BATCH_SIZE_RANGE`].
    #[error("invalid upload batch size {0}; must be between 1 and 10")]
    InvalidBatchSize(usize),
    /// A delay was outside [`DELAY_RANGE_SECS`].
    #[error("invalid {} delay {secs}s; must be between 6 and 12", .which.as_str())]
    InvalidDelay {
        /// Delay that failed validation.
        which: DelayKind,
        /// Rejected value in seconds.
        secs: u64,
    },
}

/// Settings controlling upload pacing, deletion pacing and saving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    upload_batch_size: usize,
    upload_delay_secs: u64,
    deletion_delay_secs: u64,
    save_directory: PathBuf,
    open_after_save: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upload_batch_size: DEFAULT_BATCH_SIZE,
            upload_delay_secs: DEFAULT_DELAY_SECS,
            deletion_delay_secs: DEFAULT_DELAY_SECS,
            save_directory: default_save_directory(),
            open_after_save: false,
        }
    }
}

impl Settings {
    /// Start building settings from the defaults.
    #[must_use]
    pub fn builder() -> SettingsBuilder { SettingsBuilder::default() }

    /// Chunks uploaded per batch.
    #[must_use]
    pub const fn upload_batch_size(&self) -> usize { self.upload_batch_size }

    /// Pause between upload batches.
    #[must_use]
    pub const fn upload_delay(&self) -> Duration { Duration::from_secs(self.upload_delay_secs) }

    /// Pause between message deletions.
    #[must_use]
    pub const fn deletion_delay(&self) -> Duration { Duration::from_secs(self.deletion_delay_secs) }

    /// Directory reassembled files are saved to.
    #[must_use]
    pub fn save_directory(&self) -> &Path { &self.save_directory }

    /// Whether saved files are revealed to the user.
    #[must_use]
    pub const fn open_after_save(&self) -> bool { self.open_after_save }

    /// Clamp out-of-range values to the lower bound of their range.
    ///
    /// Values loaded from storage may have been edited by hand; a value the
    /// settings panel would not accept falls back to the smallest permitted
    /// one rather than failing.
    ///
    /// # Examples
    ///
    /// ```
    /// use chunkpost::config::Settings;
    ///
    /// let loaded: Settings =
    ///     serde_json::from_str(r#"{"upload_batch_size": 40, "upload_delay_secs": 2}"#)
    ///         .expect("valid json");
    /// let repaired = loaded.sanitized();
    /// assert_eq!(repaired.upload_batch_size(), 1);
    /// assert_eq!(repaired.upload_delay().as_secs(), 6);
    /// assert_eq!(repaired.deletion_delay().as_secs(), 9);
    /// ```
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if !BATCH_SIZE_RANGE.contains(&self.upload_batch_size) {
            self.upload_batch_size = *BATCH_SIZE_RANGE.start();
        }
        for secs in [&mut self.upload_delay_secs, &mut self.deletion_delay_secs] {
            if !DELAY_RANGE_SECS.contains(secs) {
                *secs = *DELAY_RANGE_SECS.start();
            }
        }
        self
    }
}

/// Builder for [`Settings`].
///
/// # Examples
///
/// ```
/// use chunkpost::config::{ConfigError, Settings};
///
/// let settings = Settings::builder()
///     .upload_batch_size(5)
///     .open_after_save(true)
///     .build()
///     .expect("valid settings");
/// assert_eq!(settings.upload_batch_size(), 5);
///
/// assert_eq!(
///     Settings::builder().upload_batch_size(0).build(),
///     Err(ConfigError::InvalidBatchSize(0))
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// Set the number of chunks uploaded per batch.
    #[must_use]
    pub fn upload_batch_size(mut self, size: usize) -> Self {
        self.settings.upload_batch_size = size;
        self
    }

    /// Set the pause between upload batches, in seconds.
    #[must_use]
    pub fn upload_delay_secs(mut self, secs: u64) -> Self {
        self.settings.upload_delay_secs = secs;
        self
    }

    /// Set the pause between message deletions, in seconds.
    #[must_use]
    pub fn deletion_delay_secs(mut self, secs: u64) -> Self {
        self.settings.deletion_delay_secs = secs;
        self
    }

    /// Set the directory reassembled files are saved to.
    #[must_use]
    pub fn save_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.settings.save_directory = directory.into();
        self
    }

    /// Reveal saved files to the user.
    #[must_use]
    pub fn open_after_save(mut self, enabled: bool) -> Self {
        self.settings.open_after_save = enabled;
        self
    }

    /// Validate and return the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBatchSize`] if the batch size is outside
    /// `1..=10` and [`ConfigError::InvalidDelay`] if either delay is outside
    /// `6..=12` seconds.
    pub fn build(self) -> Result<Settings, ConfigError> {
        let settings = self.settings;
        if !BATCH_SIZE_RANGE.contains(&settings.upload_batch_size) {
            return Err(ConfigError::InvalidBatchSize(settings.upload_batch_size));
        }
        for (which, secs) in [
            (DelayKind::Upload, settings.upload_delay_secs),
            (DelayKind::Deletion, settings.deletion_delay_secs),
        ] {
            if !DELAY_RANGE_SECS.contains(&secs) {
                return Err(ConfigError::InvalidDelay { which, secs });
            }
        }
        Ok(settings)
    }
}

/// The platform downloads folder.
///
/// Falls back to `Downloads` under the home directory, then to a relative
/// `Downloads` directory when neither is known.
#[must_use]
pub fn default_save_directory() -> PathBuf {
    if let Some(downloads) = dirs::download_dir() {
        return downloads;
    }
    if let Some(home) = dirs::home_dir() {
        return home.join("Downloads");
    }
    PathBuf::from("Downloads")
}
