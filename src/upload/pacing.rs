//! Batch grouping and spacing for chunk uploads.
//!
//! Uploading a few hundred attachments back to back trips host rate limits,
//! so blobs go out in small batches with a fixed pause between batches. The
//! pause is enforced with a [`leaky_bucket::RateLimiter`] holding a single
//! token: the first batch takes it immediately and every later batch waits
//! one refill interval.

use std::{num::NonZeroUsize, time::Duration};

use leaky_bucket::RateLimiter;

use super::{NamedBlob, UploadError};
use crate::{
    config::Settings,
    host::{ChannelId, Uploader},
    metrics,
};

/// Build a single-token limiter releasing one permit per `interval`.
///
/// `initial` is the number of permits available straight away.
pub(crate) fn pacing_limiter(interval: Duration, initial: usize) -> RateLimiter {
    RateLimiter::builder()
        .initial(initial)
        .refill(1)
        .interval(interval.max(Duration::from_millis(1)))
        .max(1)
        .build()
}

/// Groups blobs into batches and spaces the batches out in time.
///
/// # Examples
///
/// ```
/// use std::{num::NonZeroUsize, time::Duration};
///
/// use bytes::Bytes;
/// use chunkpost::upload::{BatchPacer, NamedBlob};
///
/// let pacer = BatchPacer::new(NonZeroUsize::new(2).expect("non-zero"), Duration::from_secs(9));
/// let blobs: Vec<_> = (0..5)
///     .map(|i| NamedBlob::new(format!("{i}-4_a.dlfc"), Bytes::new()))
///     .collect();
/// let sizes: Vec<_> = pacer.batches(blobs).iter().map(Vec::len).collect();
/// assert_eq!(sizes, [2, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPacer {
    batch_size: NonZeroUsize,
    delay: Duration,
}

impl BatchPacer {
    /// Create a pacer sending `batch_size` blobs per batch with `delay`
    /// between batches.
    #[must_use]
    pub const fn new(batch_size: NonZeroUsize, delay: Duration) -> Self {
        Self { batch_size, delay }
    }

    /// Create a pacer from the configured batch size and upload delay.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            NonZeroUsize::new(settings.upload_batch_size()).unwrap_or(NonZeroUsize::MIN),
            settings.upload_delay(),
        )
    }

    /// Same delay, one blob per batch.
    #[must_use]
    pub const fn unbatched(self) -> Self { Self::new(NonZeroUsize::MIN, self.delay) }

    /// Blobs per batch.
    #[must_use]
    pub const fn batch_size(&self) -> NonZeroUsize { self.batch_size }

    /// Pause between consecutive batches.
    #[must_use]
    pub const fn delay(&self) -> Duration { self.delay }

    /// Group `blobs` into batches, preserving order.
    #[must_use]
    pub fn batches(&self, blobs: Vec<NamedBlob>) -> Vec<Vec<NamedBlob>> {
        let mut batches = Vec::with_capacity(blobs.len().div_ceil(self.batch_size.get()));
        let mut current = Vec::with_capacity(self.batch_size.get());
        for blob in blobs {
            current.push(blob);
            if current.len() == self.batch_size.get() {
                batches.push(std::mem::replace(
                    &mut current,
                    Vec::with_capacity(self.batch_size.get()),
                ));
            }
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }

    /// Upload `blobs` to `destination`, one batch per delay.
    ///
    /// The first batch is sent immediately. Returns the number of blobs
    /// uploaded.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Transport`] for the first batch the host
    /// rejects; later batches are not attempted.
    pub async fn upload(
        &self,
        uploader: &dyn Uploader,
        destination: ChannelId,
        blobs: Vec<NamedBlob>,
    ) -> Result<usize, UploadError> {
        let limiter = pacing_limiter(self.delay, 1);
        let mut sent = 0;
        for (batch, blobs) in self.batches(blobs).into_iter().enumerate() {
            limiter.acquire(1).await;
            let len = blobs.len();
            log::debug!("uploading batch {batch} ({len} blobs) to channel {destination}");
            uploader
                .upload_batch(destination, blobs)
                .await
                .map_err(|source| UploadError::Transport { batch, source })?;
            metrics::inc_chunks_uploaded(len);
            sent += len;
        }
        Ok(sent)
    }
}
