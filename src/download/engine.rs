//! Batch downloader for concurrent media fetches.
//!
//! This module provides the `BatchDownloader` which runs the [`MediaFetcher`]
//! over a list of item descriptors using a semaphore-based concurrency limit,
//! and fans the outcomes back in through a completion channel.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use media_export::{BatchDownloader, MediaFetcher, NameAllocator, NoopSink, ExportEventSink};
//!
//! # async fn example(items: Vec<media_export::ItemDescriptor>) -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = BatchDownloader::new(10, MediaFetcher::new()?)?;
//! let allocator = Arc::new(NameAllocator::new("/tmp/media"));
//! let sink: Arc<dyn ExportEventSink> = Arc::new(NoopSink);
//! let report = downloader.download_all(items, &allocator, &sink).await;
//! println!("ok: {}, failed: {}", report.success_count(), report.failure_count());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, instrument, warn};

use super::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use super::error::FetchError;
use super::fetcher::MediaFetcher;
use super::naming::NameAllocator;
use crate::events::{ExportEvent, ExportEventSink};
use crate::item::ItemDescriptor;

/// Error type for batch downloader construction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Result of one fetch attempt.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The media file was written to this path.
    Success(PathBuf),
    /// The fetch failed; no file was left behind.
    Failure(FetchError),
}

/// Aggregated result of a batch.
///
/// `success_count() + failure_count()` always equals the number of
/// descriptors submitted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    successful_paths: Vec<PathBuf>,
    failure_count: usize,
}

impl BatchReport {
    /// Paths of the successfully downloaded files, in completion order.
    #[must_use]
    pub fn successful_paths(&self) -> &[PathBuf] {
        &self.successful_paths
    }

    /// Consumes the report, returning the successful paths.
    #[must_use]
    pub fn into_successful_paths(self) -> Vec<PathBuf> {
        self.successful_paths
    }

    /// Number of successful downloads.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successful_paths.len()
    }

    /// Number of failed downloads.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    /// Total number of items processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.success_count() + self.failure_count
    }
}

/// Completion message sent by each download task.
struct Completion {
    url: String,
    outcome: DownloadOutcome,
}

/// Concurrent downloader over a list of item descriptors.
///
/// # Concurrency Model
///
/// - Each descriptor runs in its own Tokio task
/// - A task acquires a semaphore permit before fetching, so at most
///   `concurrency` fetches are in flight
/// - Local names are allocated at submission, under the allocator's lock,
///   so names follow submission order even though completion order does not
/// - Outcomes arrive over a channel in completion order; a failure never
///   cancels sibling tasks
#[derive(Debug)]
pub struct BatchDownloader {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    fetcher: MediaFetcher,
}

impl BatchDownloader {
    /// Creates a downloader with the given concurrency limit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    #[instrument(level = "debug", skip(fetcher))]
    pub fn new(concurrency: usize, fetcher: MediaFetcher) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }

        debug!(
            concurrency,
            timeout_secs = fetcher.timeout().as_secs(),
            "creating batch downloader"
        );

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            fetcher,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Downloads every descriptor into the allocator's directory.
    ///
    /// Emits one [`ExportEvent::ItemDownloaded`] or [`ExportEvent::ItemFailed`]
    /// per descriptor, in completion order, and returns once every task has
    /// finished. A task that panics is counted as a failure.
    #[instrument(skip_all, fields(items = items.len(), concurrency = self.concurrency))]
    pub async fn download_all(
        &self,
        items: Vec<ItemDescriptor>,
        allocator: &Arc<NameAllocator>,
        sink: &Arc<dyn ExportEventSink>,
    ) -> BatchReport {
        let total = items.len();
        let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
        let mut handles = Vec::with_capacity(total);

        info!(total, "starting batch download");

        for item in items {
            let target = allocator.allocate_path(item.creator_username(), item.extension_or_default());
            debug!(url = %item.media_url(), path = %target.display(), "submitting download");

            let url = item.media_url().to_string();
            let semaphore = Arc::clone(&self.semaphore);
            let fetcher = self.fetcher.clone();
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                // The semaphore is owned by this downloader and never closed.
                let _permit = semaphore.acquire_owned().await.ok();

                let outcome = match fetcher.fetch(&item, &target).await {
                    Ok(path) => DownloadOutcome::Success(path),
                    Err(error) => DownloadOutcome::Failure(error),
                };
                let _ = tx.send(Completion {
                    url: item.media_url().to_string(),
                    outcome,
                });
            });
            handles.push((url, handle));
        }
        drop(tx);

        let mut report = BatchReport::default();
        while let Some(completion) = rx.recv().await {
            match completion.outcome {
                DownloadOutcome::Success(path) => {
                    let file_name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    info!(path = %path.display(), "downloaded");
                    sink.emit(ExportEvent::ItemDownloaded { file_name });
                    report.successful_paths.push(path);
                }
                DownloadOutcome::Failure(error) => {
                    warn!(url = %completion.url, error = %error, "download failed");
                    sink.emit(ExportEvent::ItemFailed {
                        url: completion.url,
                        reason: error.to_string(),
                    });
                    report.failure_count += 1;
                }
            }
        }

        for (url, handle) in handles {
            if let Err(e) = handle.await {
                warn!(url = %url, error = %e, "download task panicked");
                sink.emit(ExportEvent::ItemFailed {
                    url,
                    reason: format!("download task panicked: {e}"),
                });
                report.failure_count += 1;
            }
        }

        info!(
            completed = report.success_count(),
            failed = report.failure_count(),
            total,
            "batch download complete"
        );

        report
    }
}
